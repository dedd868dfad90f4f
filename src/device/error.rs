#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The bridge binary could not be started at all.
    #[error("failed to spawn {program} (is it installed and on PATH?): {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` returned unexpected output: {output}")]
    UnexpectedOutput { command: String, output: String },

    #[error("device {0} has no UI automation entry point")]
    AutomationUnavailable(String),
}
