//! Full backup enumeration.
//!
//! A backup is a run of file records ended by a filler packet. Entries are
//! yielded in the order the calculator sends them.

use std::iter::FusedIterator;

use hpcalcs_core::{push_entry, PacketTransport, Result, VarEntry};
use log::{error, info};

use crate::Prime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Collecting,
    Done,
}

/// Iterator over the entries of a backup in progress.
///
/// Ends after the filler packet, or after yielding the first error.
pub struct BackupEntries<'a, T> {
    prime: &'a mut Prime<T>,
    state: State,
}

impl<'a, T: PacketTransport> BackupEntries<'a, T> {
    pub(crate) fn new(prime: &'a mut Prime<T>) -> Self {
        Self {
            prime,
            state: State::Collecting,
        }
    }
}

impl<T: PacketTransport> Iterator for BackupEntries<'_, T> {
    type Item = Result<VarEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        match self.prime.recv_file() {
            Ok(Some(entry)) => {
                info!("backup: continuing due to non-empty entry");
                Some(Ok(entry))
            },
            Ok(None) => {
                info!("backup: breaking due to empty file");
                self.state = State::Done;
                None
            },
            Err(err) => {
                error!("backup: breaking due to reception failure: {err}");
                self.state = State::Done;
                Some(Err(err))
            },
        }
    }
}

impl<T: PacketTransport> FusedIterator for BackupEntries<'_, T> {}

/// Drain a backup into a list. Everything collected so far is dropped on failure.
pub(crate) fn collect<I>(entries: I) -> Result<Vec<VarEntry>>
where
    I: Iterator<Item = Result<VarEntry>>,
{
    let mut list = Vec::new();
    for entry in entries {
        push_entry(&mut list, entry?).inspect_err(|_| {
            error!("backup: couldn't grow entry list");
        })?;
    }
    Ok(list)
}
