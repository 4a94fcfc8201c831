use core::{
    fmt::{self, Display, Write},
    ops::Deref,
};

use command::Command;

use crate::{IdTable, StoreError, StoreResult};

/// First line of every listing.
pub const LISTING_HEADER: &str = "ID   \tData\n";

/// A registry operation with its value already allocated.
///
/// Building the request allocates, executing it does not, so only [`Registry::execute`] needs
/// to run under the registry lock.
#[derive(Debug, PartialEq, Eq)]
pub enum Request<V> {
    Insert(V),
    Remove(u32),
    Replace(u32, V),
}

impl<V> Request<V> {
    /// Turns a parsed command into a request, allocating the token with `make`.
    pub fn from_command<F>(command: Command<'_>, make: F) -> StoreResult<Self>
    where
        F: FnOnce(&str) -> StoreResult<V>,
    {
        Ok(match command {
            Command::New(new) => Request::Insert(make(new.token)?),
            Command::Remove(rm) => Request::Remove(rm.id),
            Command::Replace(rep) => Request::Replace(rep.id, make(rep.token)?),
        })
    }

    /// Whether executing the request allocates an id.
    pub fn needs_id(&self) -> bool {
        matches!(self, Request::Insert(_))
    }
}

/// The result of an executed [`Request`].
///
/// Removed and displaced values are handed back so the caller drops them outside the lock.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<V> {
    Inserted(u32),
    Removed(V),
    Replaced(V),
}

/// A string registry keyed by allocator-assigned ids.
pub struct Registry<T> {
    table: T,
    len: usize,
}

impl<T: IdTable> Registry<T> {
    pub fn new(table: T) -> Self {
        Registry { table, len: 0 }
    }

    pub fn insert(&mut self, value: T::Value) -> StoreResult<u32> {
        let id = self.table.insert(value)?;
        self.len += 1;
        log::debug!("stored entry {}", id);
        Ok(id)
    }

    /// Detaches the value under `id`. Lookup and removal are one table operation.
    pub fn remove(&mut self, id: u32) -> StoreResult<T::Value> {
        let value = self.table.remove(id).ok_or(StoreError::NotFound)?;
        self.len -= 1;
        log::debug!("removed entry {}", id);
        Ok(value)
    }

    /// Stores `value` under `id` and returns the value it displaced.
    pub fn replace(&mut self, id: u32, value: T::Value) -> StoreResult<T::Value> {
        let old = self.table.replace(id, value)?;
        log::debug!("replaced entry {}", id);
        Ok(old)
    }

    pub fn execute(&mut self, request: Request<T::Value>) -> StoreResult<Outcome<T::Value>> {
        match request {
            Request::Insert(value) => self.insert(value).map(Outcome::Inserted),
            Request::Remove(id) => self.remove(id).map(Outcome::Removed),
            Request::Replace(id, value) => self.replace(id, value).map(Outcome::Replaced),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writes the header and one `{id:05}\t{value}` row per entry, in id order.
    pub fn write_listing<W: Write>(&self, out: &mut W) -> fmt::Result
    where
        <T::Value as Deref>::Target: Display,
    {
        out.write_str(LISTING_HEADER)?;
        self.table
            .try_for_each(|id, value| write!(out, "{:05}\t{}\n", id, value))
    }
}

#[cfg(test)]
mod tests {
    use alloc::{
        boxed::Box,
        string::{String, ToString},
    };
    use core::cell::Cell;

    use super::*;
    use crate::MapTable;

    fn registry() -> Registry<MapTable<String>> {
        Registry::new(MapTable::new())
    }

    fn listing(reg: &Registry<MapTable<String>>) -> String {
        let mut out = String::new();
        reg.write_listing(&mut out).unwrap();
        out
    }

    /// Runs one write payload the way the proc-idr module does.
    fn write(reg: &mut Registry<MapTable<String>>, payload: &[u8]) -> StoreResult<()> {
        let Ok(command) = Command::parse_bounded(payload) else {
            return Ok(());
        };
        let request = Request::from_command(command, |token| Ok(token.to_string()))?;
        reg.execute(request).map(drop)
    }

    #[test]
    fn empty_listing_is_header_only() {
        assert_eq!(listing(&registry()), "ID   \tData\n");
    }

    #[test]
    fn new_then_list_shows_first_token() {
        let mut reg = registry();
        write(&mut reg, b"new hello world\n").unwrap();
        assert_eq!(listing(&reg), "ID   \tData\n00000\thello\n");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn listing_stops_token_at_nul() {
        let mut reg = registry();
        write(&mut reg, b"new foo\0bar\n").unwrap();
        assert_eq!(listing(&reg), "ID   \tData\n00000\tfoo\n");
    }

    #[test]
    fn new_rm_rep_scenario() {
        let mut reg = registry();
        write(&mut reg, b"new hello").unwrap();
        assert_eq!(listing(&reg), "ID   \tData\n00000\thello\n");

        write(&mut reg, b"rm 0").unwrap();
        assert_eq!(listing(&reg), "ID   \tData\n");

        assert_eq!(write(&mut reg, b"rep 0 x"), Err(StoreError::NotFound));
        assert_eq!(listing(&reg), "ID   \tData\n");
        assert!(reg.is_empty());
    }

    #[test]
    fn rows_are_zero_padded_and_ordered() {
        let mut reg = registry();
        for token in ["a", "b", "c"] {
            reg.insert(token.to_string()).unwrap();
        }
        reg.remove(1).unwrap();
        assert_eq!(listing(&reg), "ID   \tData\n00000\ta\n00002\tc\n");
    }

    #[test]
    fn second_remove_is_not_found() {
        let mut reg = registry();
        let id = reg.insert("x".to_string()).unwrap();
        assert_eq!(reg.remove(id), Ok("x".to_string()));
        assert_eq!(reg.remove(id), Err(StoreError::NotFound));
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn replace_hands_back_the_displaced_value() {
        let mut reg = registry();
        let id = reg.insert("old".to_string()).unwrap();
        let outcome = reg
            .execute(Request::Replace(id, "new".to_string()))
            .unwrap();
        assert_eq!(outcome, Outcome::Replaced("old".to_string()));
        assert_eq!(listing(&reg), "ID   \tData\n00000\tnew\n");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn replace_of_absent_id_leaves_table_unchanged() {
        let mut reg = registry();
        reg.insert("keep".to_string()).unwrap();
        let before = listing(&reg);
        assert_eq!(reg.replace(5, "x".to_string()), Err(StoreError::NotFound));
        assert_eq!(listing(&reg), before);
    }

    #[test]
    fn removed_id_is_reused() {
        let mut reg = registry();
        for token in ["a", "b", "c"] {
            reg.insert(token.to_string()).unwrap();
        }
        reg.remove(0).unwrap();
        assert_eq!(reg.insert("d".to_string()), Ok(0));
        assert_eq!(reg.insert("e".to_string()), Ok(3));
    }

    #[test]
    fn malformed_commands_do_not_reach_the_table() {
        let mut reg = registry();
        write(&mut reg, b"bogus").unwrap();
        write(&mut reg, b"new").unwrap();
        write(&mut reg, b"rm x").unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn failed_allocation_fails_the_request() {
        let command = Command::parse(b"new hello").unwrap();
        let request: StoreResult<Request<String>> =
            Request::from_command(command, |_| Err(StoreError::OutOfMemory));
        assert_eq!(request, Err(StoreError::OutOfMemory));

        let rm = Request::<String>::from_command(Command::parse(b"rm 3").unwrap(), |_| {
            Err(StoreError::OutOfMemory)
        });
        assert_eq!(rm, Ok(Request::Remove(3)));
    }

    #[test]
    fn only_insert_needs_an_id() {
        assert!(Request::Insert(()).needs_id());
        assert!(!Request::<()>::Remove(0).needs_id());
        assert!(!Request::Replace(0, ()).needs_id());
    }

    /// Counts how many values have been dropped.
    struct Tracked<'a>(&'a Cell<usize>);

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn every_value_is_dropped_exactly_once() {
        let dropped = Cell::new(0);
        let mut reg = Registry::new(MapTable::new());
        for _ in 0..4 {
            reg.insert(Box::new(Tracked(&dropped))).unwrap();
        }
        drop(reg.remove(2).unwrap());
        assert_eq!(dropped.get(), 1);

        drop(reg.replace(0, Box::new(Tracked(&dropped))).unwrap());
        assert_eq!(dropped.get(), 2);

        assert_eq!(reg.len(), 3);
        drop(reg);
        assert_eq!(dropped.get(), 5);
    }
}
