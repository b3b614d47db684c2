/// Project inspection entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use labelforge::{AnnotationSession, EngineConfig, LabelMode};

    let mut args = std::env::args().skip(1);
    let Some(root) = args.next().map(PathBuf::from) else {
        eprintln!("Usage: labelforge-native <project> [box|mask]");
        std::process::exit(2);
    };
    let mode = match args.next().map(|m| m.parse::<LabelMode>()) {
        None => LabelMode::default(),
        Some(Ok(mode)) => mode,
        Some(Err(e)) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let config = EngineConfig::resolve(&root);
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let session = match AnnotationSession::open_with_config(&root, mode, config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to open project {:?}: {}", root, e);
            std::process::exit(1);
        }
    };

    for (index, class) in session.registry().iter().enumerate() {
        let [r, g, b] = class.color;
        log::info!("Class {}: {} ({}, {}, {})", index, class.name, r, g, b);
    }

    let project = session.project();
    for (index, path) in project.images().iter().enumerate() {
        let status = if project.is_labeled(index, mode) {
            "labeled"
        } else {
            "unlabeled"
        };
        log::info!("{:>4} {:?} {}", index, path, status);
    }

    log::info!(
        "{} of {} images labeled ({} mode)",
        session.labeled_count(),
        project.len(),
        mode
    );
}

// No native entry point on WASM
#[cfg(target_arch = "wasm32")]
fn main() {}
