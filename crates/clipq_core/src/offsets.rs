use std::collections::BTreeSet;

/// Which rendition a minute offset is selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffsetKind {
    Default,
    Vertical,
}

/// Minute offsets picked for a job, one ascending set per rendition.
///
/// Selecting an offset that is already present is a no-op, so the sets never
/// hold duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectedOffsets {
    default: BTreeSet<u32>,
    vertical: BTreeSet<u32>,
}

impl SelectedOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_minutes(
        default: impl IntoIterator<Item = u32>,
        vertical: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            default: default.into_iter().collect(),
            vertical: vertical.into_iter().collect(),
        }
    }

    pub fn select(&mut self, kind: OffsetKind, minute: u32) {
        self.set_mut(kind).insert(minute);
    }

    pub fn deselect(&mut self, kind: OffsetKind, minute: u32) {
        self.set_mut(kind).remove(&minute);
    }

    /// Flip the selection of `minute`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, kind: OffsetKind, minute: u32) -> bool {
        let set = self.set_mut(kind);
        if set.remove(&minute) {
            false
        } else {
            set.insert(minute);
            true
        }
    }

    pub fn contains(&self, kind: OffsetKind, minute: u32) -> bool {
        self.set(kind).contains(&minute)
    }

    pub fn minutes(&self, kind: OffsetKind) -> Vec<u32> {
        self.set(kind).iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.vertical.is_empty()
    }

    /// Comma-joined ascending minutes, the form field encoding used on upload.
    pub fn form_value(&self, kind: OffsetKind) -> String {
        self.set(kind)
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn set(&self, kind: OffsetKind) -> &BTreeSet<u32> {
        match kind {
            OffsetKind::Default => &self.default,
            OffsetKind::Vertical => &self.vertical,
        }
    }

    fn set_mut(&mut self, kind: OffsetKind) -> &mut BTreeSet<u32> {
        match kind {
            OffsetKind::Default => &mut self.default,
            OffsetKind::Vertical => &mut self.vertical,
        }
    }
}
