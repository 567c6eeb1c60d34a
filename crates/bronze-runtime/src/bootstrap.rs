//! Building a [`System`] from configuration.

use bronze_framework::{ContainerBuilder, StdResponseSender, System};
use tracing::debug;

use crate::config::BronzeConfig;

/// Applies `config` to `root` and wraps the sealed tree in a [`System`].
///
/// The root container takes `ignore_bots` and `run_in_dm` from the system
/// settings; sub-containers added to `root` before this call keep whatever
/// they were built with.
pub fn build_system(config: &BronzeConfig, root: ContainerBuilder) -> System {
    let settings = config.system;
    let root = root
        .ignore_bots(settings.ignore_bots)
        .run_in_dm(settings.run_in_dm)
        .seal();

    debug!(
        prefix = %config.prefix,
        commands = root.commands().len(),
        "Command tree sealed"
    );

    System::standard(root, config.prefix.clone()).with_response_sender(StdResponseSender {
        send_errors: settings.send_errors,
        escape_everyone: settings.escape_everyone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;
    use bronze_framework::{Data, Reply, handler};

    #[test]
    fn test_applies_settings() {
        let config = BronzeConfig {
            prefix: "?".into(),
            system: SystemConfig {
                ignore_bots: false,
                run_in_dm: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let root = ContainerBuilder::standard().command(
            handler(|_data: Data| async move { Ok(Reply::None) }),
            "noop",
        );

        let system = build_system(&config, root);
        let options = system.root().options();
        assert!(!options.ignore_bots);
        assert!(!options.run_in_dm);
        assert_eq!(system.root().commands().len(), 1);
    }
}
