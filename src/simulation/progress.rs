use super::peer::PeerSummary;
use std::sync::mpsc::Sender;

pub trait ProgressCallback: Send {
    fn on_epoch_start(&mut self, epoch: usize);
    fn on_epoch_complete(&mut self, epoch: usize, summaries: &[PeerSummary]);
    fn on_exchange(&mut self, epoch: usize, deliveries: usize);
}

/// Reports progress through the `log` facade
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_epoch_start(&mut self, epoch: usize) {
        log::debug!("Epoch {} starting...", epoch + 1);
    }

    fn on_epoch_complete(&mut self, epoch: usize, summaries: &[PeerSummary]) {
        for summary in summaries {
            log::info!(
                "Epoch {} [{}]: {} rules ({} individuals), best {:.3}, mean {:.3}, {} GA steps, {} deleted",
                epoch + 1,
                summary.name,
                summary.stats.macroclassifiers,
                summary.stats.numerosity,
                summary.stats.best_fitness,
                summary.stats.mean_fitness,
                summary.reproductions,
                summary.removed
            );
        }
    }

    fn on_exchange(&mut self, epoch: usize, deliveries: usize) {
        log::info!("Epoch {} exchange: {} deliveries", epoch + 1, deliveries);
    }
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    EpochStart(usize),
    EpochComplete { epoch: usize, summaries: Vec<PeerSummary> },
    Exchange { epoch: usize, deliveries: usize },
}

/// Forwards progress to another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_epoch_start(&mut self, epoch: usize) {
        let _ = self.sender.send(ProgressMessage::EpochStart(epoch));
    }

    fn on_epoch_complete(&mut self, epoch: usize, summaries: &[PeerSummary]) {
        let _ = self.sender.send(ProgressMessage::EpochComplete {
            epoch,
            summaries: summaries.to_vec(),
        });
    }

    fn on_exchange(&mut self, epoch: usize, deliveries: usize) {
        let _ = self.sender.send(ProgressMessage::Exchange { epoch, deliveries });
    }
}
