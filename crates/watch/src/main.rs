use std::fs;
use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use viewer::{Appearance, RecordingSurface, WorldSnapshot, WorldViewer};

const USAGE: &str = "usage: watch [--current-user KEY] [SNAPSHOT_JSON_PATH]";

/// Rendered when no snapshot file is supplied: a 3x3 world centred on the
/// origin with two players and a pickup of each known kind.
const DEMO_SNAPSHOT_JSON: &str = r#"{
    "minX": -1, "maxX": 1, "minY": -1, "maxY": 1,
    "width": 3, "height": 3,
    "layout": {
        "-1": {"-1": 1, "0": 0, "1": 0},
        "0":  {"-1": 0, "0": 0, "1": 2},
        "1":  {"-1": 0, "0": 1, "1": 0}
    },
    "players": {
        "player-1": {
            "location": {"x": 0.0, "y": 0.0},
            "rotation": 0.0,
            "score": 3,
            "health": 5
        },
        "player-2": {
            "location": {"x": 1.0, "y": -1.0},
            "rotation": 2.5,
            "score": 1,
            "health": 4
        }
    },
    "pickups": [
        {"location": {"x": -1.0, "y": 1.0}, "type": "health"},
        {"location": {"x": 1.0, "y": 1.0}, "type": "invulnerability"},
        {"location": {"x": -1.0, "y": -1.0}, "type": "damage_boost"}
    ]
}"#;

struct Options {
    snapshot_path: Option<PathBuf>,
    current_user: Option<String>,
}

fn main() {
    init_tracing();
    info!("=== Grid Watch Startup ===");

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            error!(error = %message, "invalid_arguments");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&options) {
        error!(error = %err, "render_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options {
        snapshot_path: None,
        current_user: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--current-user" => {
                let key = args
                    .next()
                    .ok_or_else(|| "--current-user requires a player key".to_string())?;
                options.current_user = Some(key);
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag '{flag}'"));
            }
            path => {
                if options.snapshot_path.is_some() {
                    return Err("more than one snapshot path given".to_string());
                }
                options.snapshot_path = Some(PathBuf::from(path));
            }
        }
    }
    Ok(options)
}

fn run(options: &Options) -> Result<(), String> {
    let raw = match &options.snapshot_path {
        Some(path) => fs::read_to_string(path)
            .map_err(|error| format!("read snapshot '{}': {error}", path.display()))?,
        None => DEMO_SNAPSHOT_JSON.to_string(),
    };
    let snapshot = parse_snapshot_json(&raw)?;

    let mut world_viewer = WorldViewer::new(RecordingSurface::new(), snapshot, Appearance::default());
    world_viewer
        .redraw_layout()
        .map_err(|error| format!("redraw layout: {error}"))?;
    world_viewer
        .redraw_state(options.current_user.as_deref())
        .map_err(|error| format!("redraw state: {error}"))?;

    let world = world_viewer.world();
    let surface = world_viewer.surface();
    info!(
        cells = world.width as i64 * world.height as i64,
        players = world.players.len(),
        pickups = world.pickups.len(),
        shapes = surface.shape_count(),
        groups = surface.group_count(),
        "snapshot_rendered"
    );
    Ok(())
}

fn parse_snapshot_json(raw: &str) -> Result<WorldSnapshot, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, WorldSnapshot>(&mut deserializer) {
        Ok(snapshot) => Ok(snapshot),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse snapshot json: {source}"))
            } else {
                Err(format!("parse snapshot json at {path}: {source}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn demo_snapshot_parses_and_validates() {
        let snapshot = parse_snapshot_json(DEMO_SNAPSHOT_JSON).expect("demo snapshot");
        assert_eq!(snapshot.validate(), Ok(()));
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.pickups.len(), 3);
    }

    #[test]
    fn demo_world_renders_end_to_end() {
        let options = Options {
            snapshot_path: None,
            current_user: Some("player-1".to_string()),
        };
        run(&options).expect("demo render");
    }

    #[test]
    fn parse_error_names_the_failing_path() {
        let raw = r#"{
            "minX": 0, "maxX": 0, "minY": 0, "maxY": 0,
            "width": 1, "height": "one",
            "layout": {"0": {"0": 0}}
        }"#;
        let error = parse_snapshot_json(raw).expect_err("must fail");
        assert!(error.contains("height"), "got: {error}");
    }

    #[test]
    fn parse_args_accepts_current_user_and_path() {
        let options =
            parse_args(args(&["--current-user", "player-7", "world.json"])).expect("args");
        assert_eq!(options.current_user.as_deref(), Some("player-7"));
        assert_eq!(
            options.snapshot_path,
            Some(PathBuf::from("world.json"))
        );
    }

    #[test]
    fn parse_args_rejects_unknown_flags() {
        assert!(parse_args(args(&["--frobnicate"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
        assert!(parse_args(args(&["--current-user"])).is_err());
    }
}
