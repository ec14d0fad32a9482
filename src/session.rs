use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::precompute::Precomputed;

/// Why a session stopped. None of these are failures.
#[derive(Debug)]
pub enum End {
    Cancelled,
    Disconnected(io::Error),
    NoFrames,
}

/// Writes the animation to `sink` in a loop, sleeping `delay` ms after every
/// frame, until `token` is cancelled or the sink stops accepting data.
pub async fn stream<W>(animation: &Precomputed, sink: &mut W, token: &CancellationToken) -> End
where
    W: AsyncWrite + Unpin,
{
    if animation.is_empty() {
        return End::NoFrames;
    }

    let delay = Duration::from_millis(animation.delay);

    loop {
        for payload in &animation.payloads {
            if token.is_cancelled() {
                return End::Cancelled;
            }

            if let Err(e) = write(sink, payload).await {
                info!("client disconnected: {e}");

                return End::Disconnected(e);
            }

            tokio::select! {
                _ = token.cancelled() => {
                    debug!("session cancelled during frame delay");

                    return End::Cancelled;
                }

                _ = time::sleep(delay) => {}
            }
        }
    }
}

async fn write<W: AsyncWrite + Unpin>(sink: &mut W, payload: &[u8]) -> io::Result<()> {
    sink.write_all(payload).await?;
    sink.flush().await
}

#[cfg(test)]
mod tests {
    use super::{stream, End};
    use crate::precompute::Precomputed;
    use bytes::Bytes;
    use std::io;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use tokio::io::AsyncWrite;
    use tokio::time::{self, Duration, Instant};
    use tokio_util::sync::CancellationToken;

    /// Records every write together with the (paused) clock reading.
    #[derive(Clone, Default)]
    struct RecordingSink {
        writes: Arc<Mutex<Vec<(Instant, Vec<u8>)>>>,
        cancel_after: Option<(usize, CancellationToken)>,
        fail_after: Option<usize>,
    }

    impl RecordingSink {
        fn payloads(&self) -> Vec<Vec<u8>> {
            self.writes
                .lock()
                .unwrap()
                .iter()
                .map(|(_, data)| data.clone())
                .collect()
        }

        fn times(&self) -> Vec<Instant> {
            self.writes.lock().unwrap().iter().map(|(t, _)| *t).collect()
        }
    }

    impl AsyncWrite for RecordingSink {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let mut writes = self.writes.lock().unwrap();

            if self.fail_after.is_some_and(|n| writes.len() >= n) {
                return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
            }

            writes.push((Instant::now(), buf.to_vec()));

            if let Some((n, token)) = &self.cancel_after {
                if writes.len() == *n {
                    token.cancel();
                }
            }

            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn animation(frames: usize, delay: u64) -> Precomputed {
        Precomputed {
            payloads: (0..frames)
                .map(|i| Bytes::from(format!("{i}{i}\n{i}{i}\n\n")))
                .collect(),
            delay,
            square_size: 2,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_through_frames() {
        let animation = animation(3, 16);
        let token = CancellationToken::new();
        let mut sink = RecordingSink {
            cancel_after: Some((9, token.clone())),
            ..Default::default()
        };

        let end = stream(&animation, &mut sink, &token).await;

        assert!(matches!(end, End::Cancelled));

        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 9);

        for cycle in payloads.chunks(3) {
            let expected: Vec<Vec<u8>> = animation.payloads.iter().map(|p| p.to_vec()).collect();
            assert_eq!(cycle, &expected[..]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_paced_by_delay() {
        let animation = animation(2, 40);
        let token = CancellationToken::new();
        let mut sink = RecordingSink {
            cancel_after: Some((4, token.clone())),
            ..Default::default()
        };

        stream(&animation, &mut sink, &token).await;

        let times = sink.times();
        assert_eq!(times.len(), 4);

        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(40));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_delay() {
        let animation = Arc::new(animation(5, 100));
        let token = CancellationToken::new();
        let sink = RecordingSink::default();

        let task = {
            let animation = animation.clone();
            let token = token.clone();
            let mut sink = sink.clone();

            tokio::spawn(async move { stream(&animation, &mut sink, &token).await })
        };

        // frame 3 goes out at t=200ms, frame 4 would follow at t=300ms
        time::sleep(Duration::from_millis(250)).await;
        let cancelled_at = Instant::now();
        token.cancel();

        let end = task.await.unwrap();

        assert!(matches!(end, End::Cancelled));
        assert_eq!(sink.payloads().len(), 3);
        assert!(Instant::now() - cancelled_at < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_ends_session() {
        let animation = animation(2, 16);
        let token = CancellationToken::new();
        let mut sink = RecordingSink {
            fail_after: Some(3),
            ..Default::default()
        };

        let end = stream(&animation, &mut sink, &token).await;

        assert!(matches!(end, End::Disconnected(e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(sink.payloads().len(), 3);
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled() {
        let animation = animation(2, 16);
        let token = CancellationToken::new();
        token.cancel();
        let mut sink = RecordingSink::default();

        let end = stream(&animation, &mut sink, &token).await;

        assert!(matches!(end, End::Cancelled));
        assert!(sink.payloads().is_empty());
    }

    #[tokio::test]
    async fn no_frames() {
        let animation = animation(0, 16);
        let token = CancellationToken::new();
        let mut sink = RecordingSink::default();

        let end = stream(&animation, &mut sink, &token).await;

        assert!(matches!(end, End::NoFrames));
        assert!(sink.payloads().is_empty());
    }

    #[tokio::test]
    async fn writes_into_byte_buffer() {
        let animation = animation(2, 16);
        let token = CancellationToken::new();
        let (mut writer, mut reader) = tokio::io::duplex(64);

        let task = tokio::spawn({
            let token = token.clone();
            async move { stream(&animation, &mut writer, &token).await }
        });

        let mut buf = vec![0; 14];
        tokio::io::AsyncReadExt::read_exact(&mut reader, &mut buf).await.unwrap();
        assert_eq!(buf, b"00\n00\n\n11\n11\n\n");

        drop(reader);
        let end = task.await.unwrap();

        assert!(matches!(end, End::Disconnected(_)));
    }
}
