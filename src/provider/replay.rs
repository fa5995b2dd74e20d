use rust_decimal::Decimal;
use std::{
    collections::HashMap,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::error::FetchError;

use super::QuoteProvider;

/// One recorded fetch result. `None` replays an outage.
pub type ReplayFrame = Option<HashMap<String, Decimal>>;

/// Serves recorded closes, one frame per fetch, in file order.
#[derive(Debug, Default)]
pub struct ReplayProvider {
    frames: Vec<ReplayFrame>,
    cursor: AtomicUsize,
}

impl ReplayProvider {
    pub fn from_frames(frames: Vec<ReplayFrame>) -> Self {
        Self {
            frames,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Reads a JSON lines file where every line is an object of symbol to
    /// close, or `null`. Blank lines are ignored.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let mut frames = vec![];
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let frame = serde_json::de::from_str::<ReplayFrame>(line).map_err(|err| {
                anyhow::anyhow!("Invalid replay frame {} in {:?}: {}", frames.len() + 1, path, err)
            })?;
            frames.push(frame);
        }
        info!("Loaded {} replay frames from {:?}", frames.len(), path);
        Ok(Self::from_frames(frames))
    }
}

impl QuoteProvider for ReplayProvider {
    async fn latest_closes(&self, symbols: &[&str]) -> Result<HashMap<String, Decimal>, FetchError> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        let frame = self
            .frames
            .get(index)
            .ok_or(FetchError::ReplayExhausted(self.frames.len()))?;
        debug!("Replaying frame {}", index);
        let frame = frame.as_ref().ok_or(FetchError::Unavailable)?;

        symbols
            .iter()
            .map(|&symbol| {
                frame
                    .get(symbol)
                    .map(|close| (symbol.to_string(), *close))
                    .ok_or_else(|| FetchError::MissingSymbol(symbol.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_replay_frames_in_order() {
        let provider = ReplayProvider::from_frames(vec![
            Some(HashMap::from([("A".to_string(), dec!(1))])),
            None,
            Some(HashMap::from([("B".to_string(), dec!(2))])),
        ]);

        let first = provider.latest_closes(&["A"]).await.unwrap();
        assert_eq!(first.get("A"), Some(&dec!(1)));
        assert!(matches!(
            provider.latest_closes(&["A"]).await,
            Err(FetchError::Unavailable)
        ));
        assert!(matches!(
            provider.latest_closes(&["A"]).await,
            Err(FetchError::MissingSymbol(symbol)) if symbol == "A"
        ));
        assert!(matches!(
            provider.latest_closes(&["A"]).await,
            Err(FetchError::ReplayExhausted(3))
        ));
        assert!(matches!(
            provider.latest_closes(&["A"]).await,
            Err(FetchError::ReplayExhausted(3))
        ));
    }

    #[tokio::test]
    async fn test_replay_load() {
        let path = std::env::temp_dir().join(format!("pricewatch-replay-{}.jsonl", std::process::id()));
        let mut file = File::create(&path).await.unwrap();
        file.write_all(b"{\"VOO\": \"512.25\", \"JPY=X\": 150.5}\n\nnull\n")
            .await
            .unwrap();
        file.flush().await.unwrap();

        let provider = ReplayProvider::load(&path).await.unwrap();
        let closes = provider.latest_closes(&["VOO", "JPY=X"]).await.unwrap();
        assert_eq!(closes.get("VOO"), Some(&dec!(512.25)));
        assert_eq!(closes.get("JPY=X"), Some(&dec!(150.5)));
        assert!(matches!(
            provider.latest_closes(&["VOO"]).await,
            Err(FetchError::Unavailable)
        ));
        assert!(matches!(
            provider.latest_closes(&["VOO"]).await,
            Err(FetchError::ReplayExhausted(2))
        ));

        let _ = tokio::fs::remove_file(&path).await;
    }
}
