//! Single and sequenced downloads of cached assets.

pub mod sink;

use std::time::Duration;

use bytes::Bytes;
use tracing::warn;

use assethub_core::result::AppResult;
use assethub_entity::Asset;

pub use sink::{DirectorySink, DownloadSink, DownloadedFile, MemorySink};

/// Decode an asset and hand it to the sink.
pub async fn deliver_asset(sink: &dyn DownloadSink, asset: &Asset) -> AppResult<()> {
    let bytes = asset.decode_bytes()?;
    sink.deliver(DownloadedFile {
        name: asset.name.clone(),
        mime_type: asset.mime_type.clone(),
        bytes: Bytes::from(bytes),
    })
    .await
}

/// Deliver assets one at a time, `interval` apart.
///
/// Item `i` is delivered at `i * interval` after the call. A failed item is
/// logged and skipped. Returns how many were delivered.
pub async fn deliver_sequentially(
    sink: &dyn DownloadSink,
    assets: &[Asset],
    interval: Duration,
) -> usize {
    let mut delivered = 0;
    for (i, asset) in assets.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(interval).await;
        }
        match deliver_asset(sink, asset).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!(asset_id = %asset.id, name = %asset.name, error = %e, "Download failed"),
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use assethub_entity::NewAsset;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_downloads_are_spaced() {
        let sink = MemorySink::new();
        let assets: Vec<Asset> = ["a.png", "b.png", "c.png"]
            .into_iter()
            .map(|name| NewAsset::from_bytes(None, None, name, "image/png", name.as_bytes()).into_asset())
            .collect();

        let start = tokio::time::Instant::now();
        let delivered = deliver_sequentially(&sink, &assets, Duration::from_millis(300)).await;
        assert_eq!(delivered, 3);

        let offsets: Vec<u128> = sink
            .deliveries()
            .iter()
            .map(|(at, _)| at.duration_since(start).as_millis())
            .collect();
        assert_eq!(offsets, [0, 300, 600]);
        assert_eq!(sink.files()[1].bytes, Bytes::from_static(b"b.png"));
    }

    #[tokio::test]
    async fn test_broken_payload_is_skipped() {
        let sink = MemorySink::new();
        let mut broken = NewAsset::from_bytes(None, None, "x.png", "image/png", b"x").into_asset();
        broken.data = "data:image/png;base64,%%%".to_string();
        let fine = NewAsset::from_bytes(None, None, "y.png", "image/png", b"y").into_asset();

        let delivered = deliver_sequentially(&sink, &[broken, fine], Duration::ZERO).await;
        assert_eq!(delivered, 1);
        assert_eq!(sink.files()[0].name, "y.png");
    }
}
