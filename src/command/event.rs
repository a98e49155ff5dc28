use std::process::Command as ProcessCommand;

/// Environment variable carrying the listener name that fired
pub const ENV_LISTENER_NAME: &str = "CMDIVATOR_LISTENER_NAME";
/// Environment variable carrying the event name
pub const ENV_EVENT_NAME: &str = "CMDIVATOR_EVENT_NAME";
/// Environment variable carrying the event mode
pub const ENV_EVENT_MODE: &str = "CMDIVATOR_EVENT_MODE";
/// Environment variable carrying the originating application identifier
pub const ENV_APPLICATION: &str = "CMDIVATOR_APPLICATION";

/// A trigger delivered by the host event dispatcher.
///
/// `listener_name` selects the command; the rest is context handed to the
/// spawned process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// Listener the host resolved the trigger to
    pub listener_name: String,
    /// Name of the event that fired (e.g. a gesture or button)
    pub name: String,
    /// Host mode at the time of the event
    pub mode: String,
    /// Identifier of the frontmost application, if any
    pub application: Option<String>,
}

impl Event {
    /// An event addressed to `listener_name` with no further context
    pub fn new(listener_name: impl Into<String>) -> Self {
        Self {
            listener_name: listener_name.into(),
            ..Self::default()
        }
    }

    /// Set the event name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the host mode
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Set the originating application
    #[must_use]
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Export the event into a child's environment
    pub(crate) fn apply(&self, process: &mut ProcessCommand) {
        process
            .env(ENV_LISTENER_NAME, &self.listener_name)
            .env(ENV_EVENT_NAME, &self.name)
            .env(ENV_EVENT_MODE, &self.mode);

        match &self.application {
            Some(application) => {
                process.env(ENV_APPLICATION, application);
            }
            None => {
                process.env_remove(ENV_APPLICATION);
            }
        }
    }
}
