// Declare the modules
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod state;

#[cfg(feature = "desktop")]
pub mod commands;

use config::RunMode;

/// Sets up `env_logger`. `RUST_LOG` wins over the mode's default filter.
pub fn init_logging(mode: RunMode) {
    let env = env_logger::Env::default().default_filter_or(mode.default_log_filter());
    // Ignore the error if a logger is already installed (tests, embedding apps)
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::{
        copy_pin, export_results, generate_all_descriptions, generate_description, generate_pins,
        get_state, open_url, set_api_key, set_blog_content, set_blog_title, set_provider, AppContext,
        STATE_EVENT,
    };
    use config::AppConfig;
    use orchestrator::Generator;
    use state::StateHolder;
    use tauri::{Emitter, Manager};

    let config = AppConfig::from_env();
    let mode = config.as_ref().map(|c| c.mode).unwrap_or_default();
    init_logging(mode);
    let config = config.unwrap_or_else(|e| {
        log::warn!("Invalid configuration, using defaults: {:#}", e);
        AppConfig::default()
    });
    log::info!(
        "Starting PinGenie in {:?} mode (strict normalization: {})",
        config.mode,
        config.strict_normalization
    );

    tauri::Builder::default()
        .setup(move |app| {
            let app_handle = app.handle().clone();
            // Push every committed snapshot to the webview
            let state = StateHolder::new().with_listener(move |snapshot| {
                if let Err(e) = app_handle.emit(STATE_EVENT, snapshot) {
                    log::error!("Failed to emit {} event: {:?}", STATE_EVENT, e);
                }
            });
            app.manage(AppContext {
                state,
                generator: Generator::from_config(&config),
            });
            Ok(())
        })
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_clipboard_manager::init())
        .invoke_handler(tauri::generate_handler![
            get_state,
            set_provider,
            set_api_key,
            set_blog_title,
            set_blog_content,
            generate_pins,
            generate_description,
            generate_all_descriptions,
            export_results,
            copy_pin,
            open_url
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
