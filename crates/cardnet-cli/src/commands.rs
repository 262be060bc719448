//! CLI command implementations.

use crate::config::{Config, CARDNET_DIR};
use cardnet_core::{Person, PersonUpdate};
use cardnet_graph::{FriendNetwork, GraphStore, NetworkBuilder};
use cardnet_server::{CardnetServer, ServerConfig};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// An opened project. Every write is saved before it becomes visible.
struct Workspace {
    network: FriendNetwork,
}

impl Workspace {
    fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        let db_path = config.db_path(root);
        debug!("Opening store at {}", db_path.display());

        let store = GraphStore::open(&db_path)?;
        let graph = store.load_or_default()?;
        Ok(Self {
            network: FriendNetwork::with_sink(graph, Arc::new(store)),
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_person(person: &Person) {
    let mut details = Vec::new();
    if let Some(ref position) = person.position {
        details.push(position.clone());
    }
    if let Some(ref company) = person.company {
        details.push(company.clone());
    }

    println!(
        "  {} {} {}",
        person.user_id.cyan(),
        person.name,
        details.join(" @ ").dimmed()
    );
}

/// Initialize Cardnet in a directory.
pub fn init(root: &Path) -> Result<()> {
    let cardnet_dir = root.join(CARDNET_DIR);

    if cardnet_dir.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    let config = Config::default();
    config.save(root)?;
    GraphStore::open(config.db_path(root))?;

    println!("{} Initialized Cardnet in {}", "✓".green(), root.display());
    println!("  Run {} to register someone", "cardnet add".cyan());

    Ok(())
}

/// Register a new person.
pub fn add(root: &Path, person: Person) -> Result<()> {
    let ws = Workspace::open(root)?;
    let stored = ws.network.create_person(person)?;

    println!(
        "{} Added {} (internal id {})",
        "✓".green(),
        stored.user_id.cyan(),
        stored.internal_id
    );
    Ok(())
}

/// Update attributes of an existing person.
pub fn update(root: &Path, user_id: &str, update: PersonUpdate) -> Result<()> {
    if update.is_empty() {
        println!("{} Nothing to update", "⚠".yellow());
        return Ok(());
    }

    let ws = Workspace::open(root)?;
    let person = ws.network.update_person(user_id, update)?;

    println!("{} Updated", "✓".green());
    print_person(&person);
    Ok(())
}

/// Show one person.
pub fn show(root: &Path, user_id: &str, json: bool) -> Result<()> {
    let ws = Workspace::open(root)?;
    let person = ws.network.get_person(user_id)?;

    if json {
        return print_json(&person);
    }

    print_person(&person);
    if let Some(ref email) = person.email {
        println!("    {}", email.dimmed());
    }
    Ok(())
}

/// Make two people friends.
pub fn befriend(root: &Path, user_a: &str, user_b: &str) -> Result<()> {
    let ws = Workspace::open(root)?;
    ws.network.create_friendship(user_a, user_b)?;

    println!(
        "{} {} and {} are friends",
        "✓".green(),
        user_a.cyan(),
        user_b.cyan()
    );
    Ok(())
}

/// Remove a friendship.
pub fn unfriend(root: &Path, user_a: &str, user_b: &str) -> Result<()> {
    let ws = Workspace::open(root)?;
    ws.network.delete_friendship(user_a, user_b)?;

    println!(
        "{} {} and {} are not friends",
        "✓".green(),
        user_a.cyan(),
        user_b.cyan()
    );
    Ok(())
}

/// List direct friends.
pub fn friends(root: &Path, user_id: &str, json: bool) -> Result<()> {
    let ws = Workspace::open(root)?;
    let friends = ws.network.list_direct_friends(user_id)?;

    if json {
        return print_json(&friends);
    }

    if friends.is_empty() {
        println!("{} has no friends yet", user_id);
        return Ok(());
    }

    println!("{} friends:\n", friends.len());
    for person in &friends {
        print_person(person);
    }
    Ok(())
}

/// Recommend people to connect with.
pub fn recommend(root: &Path, user_id: &str, json: bool) -> Result<()> {
    let ws = Workspace::open(root)?;
    let recommendations = ws.network.recommend_friends(user_id);

    if json {
        return print_json(&recommendations);
    }

    if recommendations.is_empty() {
        println!("No recommendations for \"{}\"", user_id);
        return Ok(());
    }

    println!("People {} may know:\n", user_id);
    for rec in &recommendations {
        println!(
            "  {:>3} {} {}",
            rec.mutual_friends.to_string().yellow(),
            rec.person.user_id.cyan(),
            rec.person.name
        );
    }
    Ok(())
}

/// Show the extended network with hop distances.
pub fn network(root: &Path, user_id: &str, json: bool) -> Result<()> {
    let ws = Workspace::open(root)?;
    let connections = ws.network.network_connections(user_id);

    if json {
        return print_json(&connections);
    }

    if connections.is_empty() {
        println!("{} has no network yet", user_id);
        return Ok(());
    }

    let mut current = 0;
    for conn in &connections {
        if conn.distance != current {
            current = conn.distance;
            let label = match current {
                1 => "1st degree".to_string(),
                2 => "2nd degree".to_string(),
                3 => "3rd degree".to_string(),
                n => format!("{}th degree", n),
            };
            println!("\n{}", label.bold());
        }
        print_person(&conn.person);
    }
    Ok(())
}

/// Show friends shared by two people.
pub fn mutual(root: &Path, user_a: &str, user_b: &str, json: bool) -> Result<()> {
    let ws = Workspace::open(root)?;
    let mutual = ws.network.mutual_friends(user_a, user_b)?;

    if json {
        return print_json(&mutual);
    }

    println!(
        "{} and {} share {} friends",
        user_a.cyan(),
        user_b.cyan(),
        mutual.len()
    );
    for person in &mutual {
        print_person(person);
    }
    Ok(())
}

/// Show store status and statistics.
pub fn status(root: &Path) -> Result<()> {
    if !root.join(CARDNET_DIR).exists() {
        println!("{} Cardnet not initialized in this directory", "✗".red());
        println!("  Run {} to initialize", "cardnet init".cyan());
        return Ok(());
    }

    let config = Config::load(root)?;
    let ws = Workspace::open(root)?;
    let stats = ws.network.stats();

    println!("{}", "Cardnet Status".cyan().bold());
    println!();
    println!("  {} {}", "Data:".dimmed(), config.db_path(root).display());
    println!("  {} {}", "People:".dimmed(), stats.person_count);
    println!("  {} {}", "Friendships:".dimmed(), stats.friendship_count);

    match ws.network.verify_symmetry() {
        Ok(()) => println!("  {} {}", "Integrity:".dimmed(), "ok".green()),
        Err(e) => println!("  {} {}", "Integrity:".dimmed(), e.to_string().red()),
    }

    Ok(())
}

/// Contents of an import file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportFile {
    pub persons: Vec<Person>,
    pub friendships: Vec<(String, String)>,
}

/// Load persons and friendships from a JSON file into the store.
pub fn import(root: &Path, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)?;
    let data: ImportFile = serde_json::from_str(&text)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!(
        "Importing {} people and {} friendships...",
        data.persons.len(),
        data.friendships.len()
    ));

    let config = Config::load(root)?;
    let store = GraphStore::open(config.db_path(root))?;

    let mut builder = NetworkBuilder::from_graph(store.load_or_default()?);
    builder.add_persons(data.persons);
    for (user_a, user_b) in data.friendships {
        builder.add_friendship(user_a, user_b);
    }
    let result = builder.build()?;
    store.save_graph(&result.graph)?;

    spinner.finish_and_clear();

    println!(
        "{} Imported {} people and {} friendships",
        "✓".green(),
        result.persons_added.to_string().cyan(),
        result.friendships_added.to_string().cyan()
    );

    if !result.skipped.is_empty() {
        println!("\n{} skipped friendships:", "⚠".yellow());
        for skipped in result.skipped.iter().take(5) {
            println!(
                "  {} - {}: {}",
                skipped.user_a.red(),
                skipped.user_b.red(),
                skipped.reason
            );
        }
        if result.skipped.len() > 5 {
            println!("  ... and {} more", result.skipped.len() - 5);
        }
    }

    Ok(())
}

/// Export the graph to JSON.
pub fn export(root: &Path, output: &Path) -> Result<()> {
    let ws = Workspace::open(root)?;

    let export = ws.network.read(|graph| {
        let persons: Vec<_> = graph.persons().collect();
        serde_json::json!({
            "version": "1.0",
            "stats": graph.stats(),
            "persons": persons,
            "edges": graph.export_edges()
        })
    });

    fs::write(output, serde_json::to_string_pretty(&export)?)?;
    println!("{} Exported to {}", "✓".green(), output.display());

    Ok(())
}

/// Start the Cardnet server.
pub async fn serve(root: &Path, port: Option<u16>, headless: bool) -> Result<()> {
    let config = Config::load(root)?;
    let bind_addr = if headless {
        "0.0.0.0".to_string()
    } else {
        config.server.host.clone()
    };
    let port = port.unwrap_or(config.server.port);

    if headless {
        println!("{}", "Starting Cardnet server in headless mode...".cyan());
    } else {
        println!("{}", "Starting Cardnet server...".cyan());
    }

    let store = GraphStore::open(config.db_path(root))?;
    let graph = store.load_or_default()?;
    let network = Arc::new(FriendNetwork::with_sink(graph, Arc::new(store)));
    let stats = network.stats();

    println!(
        "{} Loaded {} people ({} friendships)",
        "✓".green(),
        stats.person_count,
        stats.friendship_count
    );

    let addr = format!("{}:{}", bind_addr, port).parse()?;
    let server = CardnetServer::new(network, ServerConfig { addr });

    println!("{} Listening on ws://{}:{}", "✓".green(), bind_addr, port);
    if headless {
        println!("  Headless mode: accepting connections from any host");
    }
    println!("  Press {} to stop", "Ctrl+C".cyan());

    server.run().await.map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_commands_share_the_store() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        init(root).unwrap();
        add(root, Person::new("u1", "Ada")).unwrap();
        add(root, Person::new("u2", "Bob")).unwrap();
        befriend(root, "u1", "u2").unwrap();

        let ws = Workspace::open(root).unwrap();
        assert!(ws.network.are_friends("u2", "u1"));
        drop(ws);

        unfriend(root, "u2", "u1").unwrap();
        let ws = Workspace::open(root).unwrap();
        assert!(!ws.network.are_friends("u1", "u2"));
        assert_eq!(ws.network.stats().person_count, 2);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        add(root, Person::new("u1", "Ada")).unwrap();
        assert!(add(root, Person::new("u1", "Again")).is_err());
    }

    #[test]
    fn test_import_and_export() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        let file = root.join("people.json");
        fs::write(
            &file,
            r#"{
                "persons": [
                    {"userId": "u1", "name": "Ada"},
                    {"userId": "u2", "name": "Bob"},
                    {"userId": "u3", "name": "Cy"}
                ],
                "friendships": [["u1", "u2"], ["u2", "u3"], ["u3", "nobody"]]
            }"#,
        )
        .unwrap();

        import(root, &file).unwrap();

        let out = root.join("export.json");
        export(root, &out).unwrap();
        let exported: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();

        assert_eq!(exported["stats"]["personCount"], 3);
        assert_eq!(exported["stats"]["friendshipCount"], 2);
        assert_eq!(exported["edges"].as_array().unwrap().len(), 4);
        assert_eq!(exported["edges"][0]["source"], "u1");
        assert_eq!(exported["edges"][0]["kind"], "FRIEND_OF");
    }
}
