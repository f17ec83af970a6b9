use crate::transport::MediaHandle;
use parley_core::PeerId;
use std::collections::HashMap;

/// One entry per known participant, self included.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: PeerId,
    pub display_name: String,
    pub is_speaking: bool,
    pub is_muted: bool,
    pub media: Option<MediaHandle>,
}

impl Participant {
    fn new(id: PeerId, display_name: String) -> Self {
        Self {
            id,
            display_name,
            is_speaking: false,
            is_muted: false,
            media: None,
        }
    }
}

/// Participant state owned by the room loop and rendered by the observer.
pub struct ParticipantDirectory {
    self_id: PeerId,
    entries: HashMap<PeerId, Participant>,
}

impl ParticipantDirectory {
    pub fn new(self_id: PeerId) -> Self {
        let mut directory = Self {
            self_id: self_id.clone(),
            entries: HashMap::new(),
        };
        directory.insert_self();
        directory
    }

    fn insert_self(&mut self) {
        self.entries.insert(
            self.self_id.clone(),
            Participant::new(self.self_id.clone(), "You".to_owned()),
        );
    }

    pub fn self_id(&self) -> &PeerId {
        &self.self_id
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&Participant> {
        self.entries.get(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.entries.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a remote peer, created as `User` + short id if missing.
    pub fn ensure_remote(&mut self, peer_id: &PeerId) -> &mut Participant {
        self.entries.entry(peer_id.clone()).or_insert_with(|| {
            Participant::new(peer_id.clone(), format!("User{}", peer_id.short()))
        })
    }

    pub fn attach_media(&mut self, peer_id: &PeerId, media: MediaHandle) {
        self.ensure_remote(peer_id).media = Some(media);
    }

    /// Self is never removed this way; see [`clear`](Self::clear).
    pub fn remove(&mut self, peer_id: &PeerId) -> Option<Participant> {
        if *peer_id == self.self_id {
            return None;
        }
        self.entries.remove(peer_id)
    }

    pub fn set_muted(&mut self, peer_id: &PeerId, value: bool) -> bool {
        match self.entries.get_mut(peer_id) {
            Some(p) if p.is_muted != value => {
                p.is_muted = value;
                true
            }
            _ => false,
        }
    }

    pub fn set_speaking(&mut self, peer_id: &PeerId, value: bool) -> bool {
        match self.entries.get_mut(peer_id) {
            Some(p) if p.is_speaking != value => {
                p.is_speaking = value;
                true
            }
            _ => false,
        }
    }

    /// Self first, then remote peers ordered by id.
    pub fn snapshot(&self) -> Vec<Participant> {
        let mut remote: Vec<Participant> = self
            .entries
            .values()
            .filter(|p| p.id != self.self_id)
            .cloned()
            .collect();
        remote.sort_by(|a, b| a.id.cmp(&b.id));

        let mut all = Vec::with_capacity(remote.len() + 1);
        if let Some(me) = self.entries.get(&self.self_id) {
            all.push(me.clone());
        }
        all.extend(remote);
        all
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
