/// Native entry point: lays out an image file in a headless viewport and
/// prints the resulting transform.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use imgpan::headless::{MemoryContainer, MemoryImage, MemoryLoader};
    use imgpan::{ViewportConfig, ViewportController, logging};

    let config_file = ViewportConfig::config_file();
    let stored = config_file.as_deref().map(ViewportConfig::read_file);
    let config = match &stored {
        Some(Ok(Some(config))) => config.clone(),
        _ => ViewportConfig::default(),
    };
    logging::init(config.log_level);
    if let Some(Err(e)) = stored {
        log::warn!("Ignoring config file: {}", e);
    }

    let mut args = std::env::args().skip(1).peekable();
    let save_config = args.next_if(|arg| arg == "--save-config").is_some();
    let Some(path) = args.next() else {
        eprintln!("usage: imgpan-native [--save-config] <image> [container-width container-height]");
        std::process::exit(2);
    };

    if save_config {
        match &config_file {
            Some(file) => {
                if let Err(e) = config.write_file(file) {
                    eprintln!("Failed to save config: {}", e);
                }
            }
            None => eprintln!("No config directory on this platform"),
        }
    }

    let width = args.next().and_then(|s| s.parse().ok()).unwrap_or(800.0);
    let height = args.next().and_then(|s| s.parse().ok()).unwrap_or(600.0);

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let mut controller = match ViewportController::builder()
        .container(MemoryContainer::new(width, height))
        .image(MemoryImage::new())
        .loader(MemoryLoader::new())
        .config(config)
        .build()
    {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let ticket = match controller.load(&bytes) {
        Ok(ticket) => ticket,
        Err(e) => {
            eprintln!("Failed to load {}: {}", path, e);
            std::process::exit(1);
        }
    };

    // Nothing lays the image out here, so centering uses its natural size
    if let Err(e) = controller.complete_load(ticket) {
        eprintln!("Failed to complete load: {}", e);
        std::process::exit(1);
    }

    let centered = controller.transform();
    println!(
        "centered: scale={} left={} top={}",
        centered.scale,
        centered.css_left(),
        centered.css_top()
    );

    if controller.fit_to_container() {
        let fitted = controller.transform();
        println!(
            "fitted:   scale={} left={} top={}",
            fitted.scale,
            fitted.css_left(),
            fitted.css_top()
        );
    }
}

// WASM doesn't use main(), the page constructs a WebViewport instead
#[cfg(target_arch = "wasm32")]
fn main() {}
