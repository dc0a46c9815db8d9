//! Chat room registry.
//!
//! A room exists exactly while it has members: joining an absent room creates
//! it and removing the last member deletes it.

use std::collections::BTreeMap;

use log::info;

#[derive(Debug, Default)]
pub struct ChatRooms {
    rooms: BTreeMap<String, Vec<String>>,
}

impl ChatRooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` to `room`, creating it if needed. Returns the members that
    /// were already there.
    pub fn join(&mut self, room: &str, name: &str) -> Vec<String> {
        let members = self.rooms.entry(room.to_string()).or_insert_with(|| {
            info!("Room '{}' created", room);
            Vec::new()
        });
        let existing = members.clone();
        if !members.iter().any(|m| m == name) {
            members.push(name.to_string());
        }
        existing
    }

    /// Remove `name` from `room`. Returns the remaining members, or `None`
    /// if the name was not a member.
    pub fn leave(&mut self, room: &str, name: &str) -> Option<Vec<String>> {
        let members = self.rooms.get_mut(room)?;
        let before = members.len();
        members.retain(|m| m != name);
        if members.len() == before {
            return None;
        }
        let remaining = members.clone();
        if remaining.is_empty() {
            self.rooms.remove(room);
            info!("Room '{}' deleted", room);
        }
        Some(remaining)
    }

    pub fn members(&self, room: &str) -> Option<&[String]> {
        self.rooms.get(room).map(Vec::as_slice)
    }

    pub fn contains(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    /// Room names with member counts, sorted by name.
    pub fn list(&self) -> Vec<(String, usize)> {
        self.rooms
            .iter()
            .map(|(name, members)| (name.clone(), members.len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
