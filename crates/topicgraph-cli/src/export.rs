use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use topicgraph_application::ChatController;

/// Writes the active session's graph export into `dir`.
pub fn write_session(controller: &ChatController, dir: &Path) -> Result<PathBuf> {
    let export = controller.export_session()?;
    write(dir, &export.file_name(), &export.to_json_pretty()?)
}

/// Writes one topic's export into `dir`.
pub fn write_topic(controller: &mut ChatController, topic_id: &str, dir: &Path) -> Result<PathBuf> {
    let export = controller.export_topic(topic_id)?;
    write(dir, &export.file_name(), &export.to_json_pretty()?)
}

fn write(dir: &Path, file_name: &str, json: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write export {}", path.display()))?;
    tracing::info!(path = %path.display(), "Export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use topicgraph_application::{ControllerOptions, SessionManager};
    use topicgraph_core::Unattended;
    use topicgraph_infrastructure::{
        KeyValueStore, KvAppStateStore, KvSessionStore, KvSettingsRepository, MemoryKeyValueStore,
    };
    use topicgraph_interaction::OpenAiReplier;

    fn controller() -> ChatController {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let sessions = SessionManager::new(
            Arc::new(KvSessionStore::new(kv.clone()).unwrap()),
            Arc::new(KvAppStateStore::new(kv.clone())),
        );
        ChatController::new(
            sessions,
            Arc::new(KvSettingsRepository::new(kv)),
            Arc::new(OpenAiReplier::new()),
            Arc::new(Unattended),
            ControllerOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_exports_land_in_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("exports");
        let mut controller = controller();

        let session_file = write_session(&controller, &out).unwrap();
        assert!(session_file.file_name().unwrap().to_string_lossy().starts_with("chatgraph-"));
        let json = std::fs::read_to_string(&session_file).unwrap();
        assert!(json.contains("\"exportDate\""));

        let topic_id = controller.current_topic().unwrap().id().to_string();
        let topic_file = write_topic(&mut controller, &topic_id, &out).unwrap();
        assert!(
            topic_file
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("topic-general_discussion-")
        );
    }
}
