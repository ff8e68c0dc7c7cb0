// src/signal.rs

use std::fmt;
use tokio::signal;

use crate::error::{Error, Result};

/// Signals that end the serving state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl TerminationSignal {
    /// Status line printed once the process has stopped serving.
    pub fn status_message(&self) -> &'static str {
        match self {
            TerminationSignal::Interrupt => "Daemon was interrupted by system signal",
            TerminationSignal::Terminate => "Daemon was killed",
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => f.write_str("interrupt"),
            TerminationSignal::Terminate => f.write_str("terminated"),
        }
    }
}

/// Block until SIGINT or SIGTERM arrives. Resolves once.
pub async fn wait() -> Result<TerminationSignal> {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())?
            .recv()
            .await;
        Ok::<_, std::io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<()>>();

    tokio::select! {
        res = signal::ctrl_c() => {
            res.map_err(Error::Signal)?;
            Ok(TerminationSignal::Interrupt)
        }
        res = terminate => {
            res.map_err(Error::Signal)?;
            Ok(TerminationSignal::Terminate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(
            TerminationSignal::Interrupt.status_message(),
            "Daemon was interrupted by system signal"
        );
        assert_eq!(TerminationSignal::Terminate.status_message(), "Daemon was killed");
        assert_eq!(TerminationSignal::Terminate.to_string(), "terminated");
    }
}
