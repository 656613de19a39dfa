use compose_core::{FeedbackEvent, FeedbackSink};
use log::debug;
use windows::Win32::UI::WindowsAndMessaging::{MessageBeep, MB_OK};

/// Rings the default system sound when a sequence turns out to be invalid
#[derive(Debug, Default)]
pub struct BeepSink;

impl FeedbackSink for BeepSink {
    fn notify(&self, event: &FeedbackEvent) {
        if let FeedbackEvent::SequenceInvalid { .. } = event {
            // SAFETY: MessageBeep only queues a sound
            if let Err(e) = unsafe { MessageBeep(MB_OK) } {
                debug!("MessageBeep failed: {}", e);
            }
        }
    }
}
