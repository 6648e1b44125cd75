use std::sync::Once;

use mrsim_core::config::Config;
use mrsim_core::io::IoMux;
use mrsim_core::state::{Chunk, ChunkName, ChunkWriter};
use mrsim_core::{Session, Testbench};

use crate::common::mocks::model::MockModel;

static TRACING: Once = Once::new();

/// Routes harness logs through the test writer. `RUST_LOG` selects the level.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A config that never touches the network or stdout.
pub fn quiet_config() -> Config {
    let mut config = Config::default();
    config.io.echo_console = false;
    config.io.poll_interval_min = 1;
    config.io.poll_interval_max = 1;
    config.memory = crate::common::mocks::model::small_layout();
    config
}

pub struct TestContext {
    pub session: Session,
    pub tb: Testbench<MockModel>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(quiet_config())
    }

    /// Builds a detached testbench (no sockets) around a fresh mock model.
    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let io = IoMux::detached(&config.io, &config.run.initial_string);
        let model = MockModel::with_layout(config.memory.clone());
        Self {
            session: Session::new(config),
            tb: Testbench::new(model, io),
        }
    }

    pub fn model(&self) -> &MockModel {
        self.tb.model()
    }

    pub fn model_mut(&mut self) -> &mut MockModel {
        self.tb.model_mut()
    }
}

pub fn name(s: &str) -> ChunkName {
    ChunkName::new(s).expect("chunk name")
}

pub fn scalar(n: &str, v: u64) -> Chunk {
    Chunk::scalar(name(n), v)
}

/// Encodes chunks into a snapshot byte stream.
pub fn encode(chunks: &[Chunk]) -> Vec<u8> {
    let mut writer = ChunkWriter::new(Vec::new());
    for chunk in chunks {
        writer.write_chunk(chunk).expect("in-memory write");
    }
    writer.finish().expect("in-memory flush")
}
