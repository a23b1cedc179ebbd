use konv_core::{Channel, ChannelId, ChannelRepository, RepoResult};

/// Load a channel, apply `f`, and save it.
///
/// Returns the saved snapshot with `f`'s result. Nothing is written when the
/// load fails. This does not lock: two concurrent calls on one channel still
/// race, and the later save wins.
pub async fn with_channel<F, T>(
    repo: &dyn ChannelRepository,
    id: &ChannelId,
    f: F,
) -> RepoResult<(Channel, T)>
where
    F: FnOnce(&mut Channel) -> T + Send,
    T: Send,
{
    let mut channel = repo.load(id).await?;
    let output = f(&mut channel);
    repo.save(&channel).await?;
    Ok((channel, output))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use konv_cache::{KvChannelRepository, MemoryStore};
    use konv_core::{ToggleOutcome, User};

    #[tokio::test]
    async fn test_mutation_is_persisted() {
        let repo = KvChannelRepository::new(Arc::new(MemoryStore::new()));
        let channel = repo.create(&User::new("u1"), "alerts").await.unwrap();

        let (saved, outcome) = with_channel(&repo, &channel.id, |c| c.toggle_target("chat42"))
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Added);
        assert_eq!(saved.targets(), ["chat42"]);

        let loaded = repo.load(&channel.id).await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_missing_channel_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let repo = KvChannelRepository::new(store.clone());

        let err = with_channel(&repo, &ChannelId::new("nope"), |c| c.add_target("x"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.key_count(), 0);
    }
}
