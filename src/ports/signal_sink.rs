//! Output port for populated signal frames.

use crate::domain::error::SigtraderError;
use crate::domain::signal::SignalFrame;
use std::path::Path;

pub trait SignalSink {
    fn write_frame(&self, frame: &SignalFrame, output_path: &Path) -> Result<(), SigtraderError>;
}
