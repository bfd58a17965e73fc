#[derive(Debug, Clone)]
pub enum Message {
    // === PROJECT MESSAGES ===
    ProjectInitialized(String),  // path
    ProjectAlreadyExists(String), // path
    ProjectNotFound(String),      // path
    SubprojectCreated(String),    // name
    SubprojectNotFound(String),   // name
    ProjectLoadedWithErrors(usize),
    ProjectLoadFailure(String, String), // path, error
    ProjectHeader(String),              // project name

    // === TASK MESSAGES ===
    TaskCreated(String),      // id
    TaskUpdated(String),      // id
    TaskUnchanged(String),    // id
    TaskNotFound(String),     // id
    TaskRemoved(String),      // id
    TaskCopied(String, String), // source id, new id
    TaskMoved(String, String),  // source id, new id
    TaskEditRejected(String, String), // id, backup path
    TaskEditRejectedReason(String),
    TasksNotFound,
    TasksFoundCount(usize),

    // === EVENT MESSAGES ===
    EventsHeader,
    EventsNotFound,
    EventSkipped(String, String), // id, reason

    // === FILTER MESSAGES ===
    FilterInvalid(String),

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigModuleUser,
    ConfigUsernameMissing,

    // === EDITOR MESSAGES ===
    EditorNotConfigured,

    // === PROMPTS ===
    PromptUsername,
    PromptEmail,
    PromptEditor,
    PromptTaskTitle,
    PromptTaskDescription,
}
