use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pickup_planner::{
    config::Config,
    controller::{ClickOutcome, MapController, BOTH_SELECTED},
    entities::{coordinate::LatLng, selection::Role},
    locate::FixedLocator,
    map::RecordingMap,
    service::HttpPickupService,
    utils::geo::format_coord,
};

/// One user gesture, as typed on stdin.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Click(LatLng),
    Role(Role),
    Locate,
    Find,
    Confirm,
    Decline,
    Feedback(String),
    State,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match word.to_ascii_lowercase().as_str() {
            "click" => {
                let mut parts = rest.split_whitespace();
                let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next())
                else {
                    return Err("usage: click <lat> <lng>".to_string());
                };
                let lat = lat.parse().map_err(|_| format!("bad latitude: {}", lat))?;
                let lng = lng.parse().map_err(|_| format!("bad longitude: {}", lng))?;
                Ok(Command::Click(LatLng::new(lat, lng)))
            }
            "role" => rest.parse().map(Command::Role),
            "locate" => Ok(Command::Locate),
            "find" => Ok(Command::Find),
            "confirm" => Ok(Command::Confirm),
            "decline" => Ok(Command::Decline),
            "feedback" => Ok(Command::Feedback(rest.to_string())),
            "state" => Ok(Command::State),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {}", other)),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pickup_planner=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(service = %config.service_url, "Using pickup service");

    let service = HttpPickupService::new(&config).expect("Failed to build HTTP client");
    let locator = FixedLocator::new(config.device_location);
    let mut controller = MapController::init(RecordingMap::new(), &config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Click(at) => match controller.handle_click(at) {
                Ok(ClickOutcome::Set(role)) => println!("{} location set: {}", role, format_coord(at)),
                Ok(ClickOutcome::Locked) => println!("{}", BOTH_SELECTED),
                Err(e) => println!("{}", e),
            },
            Command::Role(role) => match controller.select_role(role) {
                Ok(()) => println!("Placing: {}", role),
                Err(e) => println!("{}", e),
            },
            Command::Locate => match controller.use_current_location(&locator).await {
                Ok(role) => println!("{} set to your current location", role),
                Err(e) => println!("{}", e),
            },
            Command::Find => match controller.find_pickup(&service).await {
                Ok(_) => print_summary(&controller),
                Err(e) => println!("Error getting pickup point: {}", e),
            },
            Command::Confirm => match controller.confirm(&service).await {
                Ok(message) => println!("{}", message.as_deref().unwrap_or("Pickup confirmed.")),
                Err(e) => println!("{}", e),
            },
            Command::Decline => match controller.decline() {
                Ok(()) => println!("What is wrong with this pickup point? (feedback <text>)"),
                Err(e) => println!("{}", e),
            },
            Command::Feedback(text) => {
                let shown = controller.result().map(|r| r.pickup);
                match controller.submit_feedback(&service, &text).await {
                    Ok(message) => {
                        if let Some(message) = message {
                            println!("{}", message);
                        }
                        if controller.result().map(|r| r.pickup) != shown {
                            print_summary(&controller);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            Command::State => {
                let map = controller.map();
                println!(
                    "{:?}: {} markers, {} lines",
                    controller.phase(),
                    map.marker_count(),
                    map.line_count()
                );
            }
            Command::Quit => break,
        }
    }
}

fn print_summary(controller: &MapController<RecordingMap>) {
    if let Some(summary) = controller.summary() {
        println!("{}", summary);
    }
}
