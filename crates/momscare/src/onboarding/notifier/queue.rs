use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::templates::{self, TemplateSettings};
use super::{MailTransport, Notification, NotificationDispatcher};

/// Background dispatcher: `schedule` enqueues, a single worker renders and delivers each
/// notification exactly once. Failed sends are logged and dropped.
pub struct QueuedNotifier {
    sender: Mutex<Option<mpsc::UnboundedSender<Notification>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl QueuedNotifier {
    /// Spawns the delivery worker; must be called from within a Tokio runtime.
    pub fn spawn(transport: Arc<dyn MailTransport>, settings: TemplateSettings) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Notification>();

        let worker = tokio::spawn(async move {
            while let Some(notification) = receiver.recv().await {
                deliver(transport.clone(), &settings, notification).await;
            }
        });

        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Stops accepting notifications and waits for queued ones to finish.
    ///
    /// Other holders of the notifier may stay alive; anything they schedule afterwards is
    /// dropped with a warning. Calling this more than once is a no-op.
    pub async fn shutdown(&self) {
        match self.sender.lock() {
            Ok(mut sender) => drop(sender.take()),
            Err(poisoned) => drop(poisoned.into_inner().take()),
        }

        let worker = match self.worker.lock() {
            Ok(mut worker) => worker.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(worker) = worker {
            if let Err(err) = worker.await {
                warn!(error = %err, "notification worker terminated abnormally");
            }
        }
    }
}

impl NotificationDispatcher for QueuedNotifier {
    fn schedule(&self, notification: Notification) {
        let sent = match self.sender.lock() {
            Ok(sender) => match sender.as_ref() {
                Some(sender) => sender
                    .send(notification)
                    .map_err(|mpsc::error::SendError(dropped)| dropped),
                None => Err(notification),
            },
            Err(_) => Err(notification),
        };

        if let Err(dropped) = sent {
            warn!(
                template = dropped.template(),
                recipient = %dropped.applicant().email,
                "notification queue closed; dropping notification"
            );
        }
    }
}

async fn deliver(
    transport: Arc<dyn MailTransport>,
    settings: &TemplateSettings,
    notification: Notification,
) {
    let template = notification.template();
    let email = templates::render(&notification, settings);
    let recipient = email.to.clone();

    match tokio::task::spawn_blocking(move || transport.deliver(&email)).await {
        Ok(Ok(())) => debug!(template, %recipient, "notification delivered"),
        Ok(Err(err)) => warn!(template, %recipient, error = %err, "notification delivery failed"),
        Err(err) => warn!(template, %recipient, error = %err, "notification delivery aborted"),
    }
}
