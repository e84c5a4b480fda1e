// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Session input and output streams.

use shellgate_config::StdinCapture;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Input and output stream of one session
///
/// The input is read without internal buffering so that bytes not consumed
/// by a capture stay available to whatever runs after the session command.
#[derive(Debug)]
pub struct ReadWriter<R, W> {
    pub input: R,
    pub out: W,
}

impl<R, W> ReadWriter<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    /// Write `bytes` to the output and flush
    pub async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes).await?;
        self.out.flush().await
    }

    /// Read local input according to `mode`
    pub async fn capture(&mut self, mode: StdinCapture) -> io::Result<Vec<u8>> {
        match mode {
            StdinCapture::Token => self.read_token().await,
            StdinCapture::ToEnd => self.read_to_end().await,
        }
    }

    /// Read one whitespace-delimited token.
    ///
    /// Leading whitespace is skipped and the delimiter after the token is
    /// consumed. End of input yields whatever was read, possibly nothing.
    pub async fn read_token(&mut self) -> io::Result<Vec<u8>> {
        let mut token = Vec::new();

        while let Some(byte) = self.next_byte().await? {
            if byte.is_ascii_whitespace() {
                if token.is_empty() {
                    continue;
                }
                break;
            }
            token.push(byte);
        }

        Ok(token)
    }

    /// Read until end of input.
    ///
    /// Waits for the peer to close its side; an open interactive stream
    /// never completes.
    pub async fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.input.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.input.read(&mut byte).await? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reader(input: &[u8]) -> ReadWriter<&[u8], Vec<u8>> {
        ReadWriter::new(input, Vec::new())
    }

    #[tokio::test]
    async fn test_read_token_skips_leading_whitespace() {
        let mut rw = reader(b"  \n\tinput rest");
        assert_eq!(rw.read_token().await.unwrap(), b"input");
        assert_eq!(rw.read_token().await.unwrap(), b"rest");
        assert_eq!(rw.read_token().await.unwrap(), b"");
    }

    #[tokio::test]
    async fn test_read_token_consumes_one_delimiter() {
        let mut rw = reader(b"first\n\nsecond");
        assert_eq!(rw.read_token().await.unwrap(), b"first");
        assert_eq!(rw.input, b"\nsecond");
    }

    #[tokio::test]
    async fn test_read_token_across_partial_reads() {
        let input = tokio_test::io::Builder::new()
            .read(b"  inp")
            .read(b"ut\nnext")
            .build();
        let mut rw = ReadWriter::new(input, Vec::new());

        assert_eq!(rw.read_token().await.unwrap(), b"input");
        assert_eq!(rw.read_token().await.unwrap(), b"next");
    }

    #[tokio::test]
    async fn test_read_token_at_eof_is_empty() {
        let mut rw = reader(b"");
        assert!(rw.read_token().await.unwrap().is_empty());

        let mut rw = reader(b"   ");
        assert!(rw.read_token().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capture_to_end_keeps_everything() {
        let mut rw = reader(b"line one\nline two\n");
        let captured = rw.capture(StdinCapture::ToEnd).await.unwrap();
        assert_eq!(captured, b"line one\nline two\n");
    }

    #[tokio::test]
    async fn test_capture_to_end_waits_for_close() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut rw = ReadWriter::new(server, Vec::new());

        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            rw.capture(StdinCapture::ToEnd),
        )
        .await;
        assert!(pending.is_err(), "capture must not finish while input is open");

        client.write_all(b"data\n").await.unwrap();
        drop(client);
        assert_eq!(rw.capture(StdinCapture::ToEnd).await.unwrap(), b"data\n");
    }

    #[tokio::test]
    async fn test_write_all() {
        let mut rw = reader(b"");
        rw.write_all(b"custom\n").await.unwrap();
        assert_eq!(rw.out, b"custom\n");
    }
}
