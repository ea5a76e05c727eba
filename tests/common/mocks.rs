//! Output sink whose writes can be scripted to fail.
use mockall::mock;

use std::io::{self, ErrorKind, Write};

mock! {
    pub Output {}
    impl Write for Output {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

/// Sink refusing every write, like a file on a read-only mount.
pub fn read_only_output() -> MockOutput {
    let mut output = MockOutput::default();
    output
        .expect_write()
        .returning(|_buf| Err(io::Error::from(ErrorKind::PermissionDenied)));
    output.expect_flush().returning(|| Ok(()));
    output
}
