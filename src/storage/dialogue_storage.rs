use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::reminder::UserId;

/// Per-user conversation state. A user without an entry is idle.
#[async_trait]
pub trait DialogueStorage<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    async fn get_dialogue(&self, user: &UserId) -> Option<S>;
    async fn update_dialogue(&self, user: UserId, state: S);
    async fn remove_dialogue(&self, user: &UserId) -> Option<S>;
}

pub struct InMemDialogueStorage<S> {
    dialogues: RwLock<HashMap<UserId, S>>,
}

impl<S> InMemDialogueStorage<S> {
    pub fn new() -> Self {
        Self {
            dialogues: RwLock::new(HashMap::new()),
        }
    }
}

impl<S> Default for InMemDialogueStorage<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> DialogueStorage<S> for InMemDialogueStorage<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn get_dialogue(&self, user: &UserId) -> Option<S> {
        self.dialogues.read().await.get(user).cloned()
    }

    async fn update_dialogue(&self, user: UserId, state: S) {
        self.dialogues.write().await.insert(user, state);
    }

    async fn remove_dialogue(&self, user: &UserId) -> Option<S> {
        self.dialogues.write().await.remove(user)
    }
}
