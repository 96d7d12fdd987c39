// Tauri commands exposed to the frontend

use crate::export::{clipboard_text, export_file, ExportFile};
use crate::models::{AppState, Provider};
use crate::orchestrator::Generator;
use crate::state::StateHolder;
use chrono::Utc;
use tauri::State;
use tauri_plugin_clipboard_manager::ClipboardExt;
use tauri_plugin_opener::OpenerExt;

/// Event carrying the full `AppState` after every committed transition.
pub const STATE_EVENT: &str = "state-changed";

// Everything the commands need, managed by Tauri
pub struct AppContext {
    pub state: StateHolder,
    pub generator: Generator,
}

#[tauri::command]
pub async fn get_state(ctx: State<'_, AppContext>) -> Result<AppState, String> {
    Ok(ctx.state.snapshot().await)
}

#[tauri::command]
pub async fn set_provider(ctx: State<'_, AppContext>, provider: Provider) -> Result<(), String> {
    log::info!("Frontend selected provider {}", provider);
    ctx.state.set_provider(provider).await;
    Ok(())
}

// The key only ever lives in memory and is never logged
#[tauri::command]
pub async fn set_api_key(ctx: State<'_, AppContext>, api_key: String) -> Result<(), String> {
    ctx.state.set_api_key(api_key).await;
    Ok(())
}

#[tauri::command]
pub async fn set_blog_title(ctx: State<'_, AppContext>, title: String) -> Result<(), String> {
    ctx.state.set_blog_title(title).await;
    Ok(())
}

#[tauri::command]
pub async fn set_blog_content(ctx: State<'_, AppContext>, content: String) -> Result<(), String> {
    ctx.state.set_blog_content(content).await;
    Ok(())
}

// Resolves once the pins (or the error) are committed; the UI follows along through STATE_EVENT
#[tauri::command]
pub async fn generate_pins(ctx: State<'_, AppContext>) -> Result<usize, String> {
    log::info!("Frontend requested pin generation");
    ctx.generator.run_generation(&ctx.state).await
}

#[tauri::command]
pub async fn generate_description(ctx: State<'_, AppContext>, index: usize) -> Result<(), String> {
    log::info!("Frontend requested description for pin {}", index);
    ctx.generator.generate_one_description(index, &ctx.state).await;
    Ok(())
}

#[tauri::command]
pub async fn generate_all_descriptions(ctx: State<'_, AppContext>) -> Result<(), String> {
    log::info!("Frontend requested descriptions for all pins");
    ctx.generator.generate_all_descriptions(&ctx.state).await;
    Ok(())
}

#[tauri::command]
pub async fn export_results(ctx: State<'_, AppContext>) -> Result<ExportFile, String> {
    let snapshot = ctx.state.snapshot().await;
    export_file(&snapshot.results, Utc::now()).ok_or_else(|| "No results to export.".to_string())
}

#[tauri::command]
pub async fn copy_pin(app: tauri::AppHandle, ctx: State<'_, AppContext>, index: usize) -> Result<(), String> {
    let snapshot = ctx.state.snapshot().await;
    let Some(prompt) = snapshot.results.get(index) else {
        return Err(format!("No pin at position {}", index + 1));
    };
    app.clipboard().write_text(clipboard_text(prompt)).map_err(|e| {
        log::error!("Failed to write pin {} to clipboard: {:?}", index, e);
        format!("Failed to copy to clipboard: {}", e)
    })
}

#[tauri::command]
pub async fn open_url(app: tauri::AppHandle, url: String) -> Result<(), String> {
    // Use the open_url method provided by the plugin via the trait
    match app.opener().open_url(url.as_str(), None::<String>) {
        Ok(_) => Ok(()),
        Err(err) => Err(format!("Failed to open URL: {}", err)),
    }
}
