//! Single-key operations (§4.4): `SADD`, `SREM`, `SISMEMBER`, `SCARD`,
//! `SMOVE`, `SPOP` (plain and counted), `SRANDMEMBER` (plain, counted,
//! and store-destination variants).

use crate::config::SetConfig;
use crate::error::SetError;
use crate::events::{EventKind, KeyspaceEvent, Notifier};
use crate::keyspace::Keyspace;
use crate::object::{Element, SetObject};
use crate::replication::{del_argv, srem_argv, PropagationTarget, Replicator};
use crate::value::Value;

use super::store_result;

/// `SADD key v1..vn`. Creates the key if absent, encoding chosen by the
/// first value. Returns the count of newly inserted distinct values.
pub fn sadd(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    config: &SetConfig,
    key: &[u8],
    values: &[Value],
) -> Result<u64, SetError> {
    let mut inserted = 0u64;
    match ks.get_mut(key)? {
        Some(obj) => {
            for v in values {
                if obj.add(v.clone(), config) {
                    inserted += 1;
                }
            }
        }
        None => {
            let mut iter = values.iter();
            let Some(first) = iter.next() else {
                return Ok(0);
            };
            let mut obj = SetObject::create_for(first);
            inserted += 1;
            for v in iter {
                if obj.add(v.clone(), config) {
                    inserted += 1;
                }
            }
            ks.insert(key, obj);
        }
    }
    if inserted > 0 {
        notifier.notify(KeyspaceEvent::new(EventKind::SAdd, key, inserted));
    }
    Ok(inserted)
}

/// `SREM key v1..vn`. Missing key returns 0 with no event. Deletes the
/// key and stops as soon as removal empties it.
pub fn srem(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    key: &[u8],
    values: &[Value],
) -> Result<u64, SetError> {
    let Some(obj) = ks.get_mut(key)? else {
        return Ok(0);
    };
    let mut removed = 0u64;
    let mut emptied = false;
    for v in values {
        if obj.remove(v) {
            removed += 1;
            if obj.is_empty() {
                emptied = true;
                break;
            }
        }
    }
    if emptied {
        ks.remove(key);
    }
    if removed > 0 {
        notifier.notify(KeyspaceEvent::new(EventKind::SRem, key, removed));
    }
    if emptied {
        notifier.notify(KeyspaceEvent::new(EventKind::Del, key, 0));
    }
    Ok(removed)
}

/// `SISMEMBER key v`.
pub fn sismember(ks: &dyn Keyspace, key: &[u8], value: &Value) -> Result<bool, SetError> {
    Ok(ks.get(key)?.is_some_and(|obj| obj.contains(value)))
}

/// `SCARD key`.
pub fn scard(ks: &dyn Keyspace, key: &[u8]) -> Result<u64, SetError> {
    Ok(ks.get(key)?.map_or(0, |obj| obj.len() as u64))
}

/// `SMOVE src dst v`.
pub fn smove(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    config: &SetConfig,
    src: &[u8],
    dst: &[u8],
    value: &Value,
) -> Result<bool, SetError> {
    if src == dst {
        return Ok(ks.get(src)?.is_some_and(|obj| obj.contains(value)));
    }

    // Type-check `dst` before mutating anything: a wrong-type `dst` must
    // abort with no mutation, even though `src` is only touched after.
    ks.get(dst)?;

    let Some(src_obj) = ks.get_mut(src)? else {
        return Ok(false);
    };
    if !src_obj.remove(value) {
        return Ok(false);
    }
    let src_emptied = src_obj.is_empty();
    if src_emptied {
        ks.remove(src);
    }
    notifier.notify(KeyspaceEvent::new(EventKind::SRem, src, 1));
    if src_emptied {
        notifier.notify(KeyspaceEvent::new(EventKind::Del, src, 0));
    }

    let inserted = match ks.get_mut(dst)? {
        Some(dst_obj) => dst_obj.add(value.clone(), config),
        None => {
            ks.insert(dst, SetObject::create_for(value));
            true
        }
    };
    if inserted {
        notifier.notify(KeyspaceEvent::new(EventKind::SAdd, dst, 1));
    }
    Ok(true)
}

/// `SPOP key` (no count): remove and return one random element.
pub fn spop(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    replicator: &mut dyn Replicator,
    key: &[u8],
) -> Result<Option<Element>, SetError> {
    let Some(obj) = ks.get_mut(key)? else {
        return Ok(None);
    };
    let Some(elem) = obj.remove_random() else {
        return Ok(None);
    };
    let emptied = obj.is_empty();
    if emptied {
        ks.remove(key);
    }
    notifier.notify(KeyspaceEvent::new(EventKind::SPop, key, 1));
    if emptied {
        notifier.notify(KeyspaceEvent::new(EventKind::Del, key, 0));
    }
    replicator.rewrite_current(srem_argv(key, &elem));
    Ok(Some(elem))
}

/// `SPOP key count`. Negative counts are out of range for this command
/// (only `SRANDMEMBER` accepts them).
pub fn spop_count(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    replicator: &mut dyn Replicator,
    config: &SetConfig,
    key: &[u8],
    count: i64,
) -> Result<Vec<Element>, SetError> {
    if count < 0 {
        return Err(SetError::OutOfRange);
    }
    if count == 0 {
        return Ok(Vec::new());
    }
    let count = count as u64;

    let Some(obj) = ks.get_mut(key)? else {
        return Ok(Vec::new());
    };
    let size = obj.len() as u64;

    if count >= size {
        let popped: Vec<Element> = obj.iter().collect();
        ks.remove(key);
        notifier.notify(KeyspaceEvent::new(EventKind::SPop, key, size));
        notifier.notify(KeyspaceEvent::new(EventKind::Del, key, 0));
        replicator.suppress_current();
        replicator.propagate(del_argv(key), PropagationTarget::Both);
        return Ok(popped);
    }

    let remaining = size - count;
    let popped = if remaining * 5 > count {
        sample_and_remove(obj, count, replicator, key)
    } else {
        rebuild_remainder(obj, count, remaining, config, replicator, key)
    };

    notifier.notify(KeyspaceEvent::new(EventKind::SPop, key, count));
    replicator.suppress_current();
    Ok(popped)
}

/// Repeatedly draw and remove one random element, propagating each as
/// its own `SREM`. Bounds work at Θ(count) — used when the reply is the
/// small side of the split.
fn sample_and_remove(
    obj: &mut SetObject,
    count: u64,
    replicator: &mut dyn Replicator,
    key: &[u8],
) -> Vec<Element> {
    let mut popped = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let elem = obj
            .remove_random()
            .expect("count < size was checked by the caller");
        replicator.propagate(srem_argv(key, &elem), PropagationTarget::Both);
        popped.push(elem);
    }
    popped
}

/// Draw `remaining` distinct random elements to become the new set,
/// then diff the original against it to find (and propagate) what was
/// popped. Bounds work at Θ(remaining) — used when the reply is the
/// large side of the split.
fn rebuild_remainder(
    obj: &mut SetObject,
    count: u64,
    remaining: u64,
    config: &SetConfig,
    replicator: &mut dyn Replicator,
    key: &[u8],
) -> Vec<Element> {
    let mut remainder = SetObject::empty();
    while (remainder.len() as u64) < remaining {
        let elem = obj
            .random_element()
            .expect("set is non-empty: remaining < size");
        remainder.add(elem.to_value(), config);
    }

    let mut popped = Vec::with_capacity(count as usize);
    for elem in obj.iter() {
        if !remainder.contains(&elem.to_value()) {
            replicator.propagate(srem_argv(key, &elem), PropagationTarget::Both);
            popped.push(elem);
        }
    }
    *obj = remainder;
    popped
}

/// `SRANDMEMBER key` (no count): peek one random element, no mutation.
pub fn srandmember(ks: &dyn Keyspace, key: &[u8]) -> Result<Option<Element>, SetError> {
    Ok(ks.get(key)?.and_then(SetObject::random_element))
}

/// `SRANDMEMBER key count`. Negative counts draw `|count|` elements
/// with repetition; non-negative counts draw distinct elements (capped
/// at the set's size).
pub fn srandmember_count(
    ks: &dyn Keyspace,
    key: &[u8],
    count: i64,
) -> Result<Vec<Element>, SetError> {
    let Some(obj) = ks.get(key)? else {
        return Ok(Vec::new());
    };
    if count == 0 {
        return Ok(Vec::new());
    }
    if count < 0 {
        let n = count.unsigned_abs();
        return Ok((0..n)
            .map(|_| {
                obj.random_element()
                    .expect("reachable sets are never empty")
            })
            .collect());
    }

    let l = count as u64;
    let size = obj.len() as u64;
    if l >= size {
        return Ok(obj.iter().collect());
    }

    Ok(if l * 3 > size {
        build_and_subtract(obj, l)
    } else {
        sample_until_unique(obj, l)
    })
}

/// Copy the whole set, then shrink by random removal down to `l`. Used
/// when `l` is a large fraction of the set.
fn build_and_subtract(obj: &SetObject, l: u64) -> Vec<Element> {
    let cfg = SetConfig::default();
    let mut temp = SetObject::empty();
    for elem in obj.iter() {
        temp.add(elem.to_value(), &cfg);
    }
    while (temp.len() as u64) > l {
        temp.remove_random();
    }
    temp.iter().collect()
}

/// Draw random elements into a fresh set until it holds `l` distinct
/// ones. Used when `l` is a small fraction of the set.
fn sample_until_unique(obj: &SetObject, l: u64) -> Vec<Element> {
    let cfg = SetConfig::default();
    let mut temp = SetObject::empty();
    while (temp.len() as u64) < l {
        let elem = obj
            .random_element()
            .expect("reachable sets are never empty");
        temp.add(elem.to_value(), &cfg);
    }
    temp.iter().collect()
}

/// `SRANDMEMBER`-STORE: writes the chosen elements as a new SET at
/// `dst`, replacing any prior value there.
pub fn srandmemberstore(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    config: &SetConfig,
    key: &[u8],
    count: i64,
    dst: &[u8],
) -> Result<u64, SetError> {
    let elements = srandmember_count(ks, key, count)?;
    let mut result = SetObject::empty();
    for elem in elements {
        result.add(elem.to_value(), config);
    }
    Ok(store_result(
        ks,
        notifier,
        dst,
        result,
        EventKind::SRandMemberStore,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingNotifier;
    use crate::keyspace::MemoryKeyspace;
    use crate::replication::{NullReplicator, RecordingReplicator};

    fn cfg(max: usize) -> SetConfig {
        SetConfig {
            intset_max_entries: max,
        }
    }

    fn values(raw: &[&str]) -> Vec<Value> {
        raw.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn scenario_s1_promotes_on_size_threshold() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg(4);
        assert_eq!(sadd(&mut ks, &mut n, &c, b"s", &values(&["1", "2", "3"])).unwrap(), 3);
        assert!(ks.get(b"s").unwrap().unwrap().is_intset());
        assert_eq!(
            sadd(&mut ks, &mut n, &c, b"s", &values(&["2", "4", "5"])).unwrap(),
            2
        );
        assert!(!ks.get(b"s").unwrap().unwrap().is_intset());
        assert_eq!(scard(&ks, b"s").unwrap(), 5);
    }

    #[test]
    fn scenario_s2_hashset_from_start_and_key_deletion() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg(512);
        assert_eq!(sadd(&mut ks, &mut n, &c, b"x", &values(&["foo", "bar"])).unwrap(), 2);
        assert!(!ks.get(b"x").unwrap().unwrap().is_intset());
        assert!(sismember(&ks, b"x", &Value::from("foo")).unwrap());
        assert!(!sismember(&ks, b"x", &Value::from("baz")).unwrap());
        assert_eq!(srem(&mut ks, &mut n, b"x", &values(&["foo", "bar"])).unwrap(), 2);
        assert!(!ks.contains(b"x"));
        assert_eq!(n.kinds(), vec![EventKind::SRem, EventKind::Del]);
    }

    #[test]
    fn scenario_s6_smove_round_trip() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg(512);
        sadd(&mut ks, &mut n, &c, b"src", &values(&["x", "y"])).unwrap();
        assert!(smove(&mut ks, &mut n, &c, b"src", b"dst", &Value::from("x")).unwrap());
        assert!(!sismember(&ks, b"src", &Value::from("x")).unwrap());
        assert!(sismember(&ks, b"src", &Value::from("y")).unwrap());
        assert!(sismember(&ks, b"dst", &Value::from("x")).unwrap());

        let before = n.events.len();
        assert!(!smove(&mut ks, &mut n, &c, b"src", b"dst", &Value::from("x")).unwrap());
        assert_eq!(n.events.len(), before);
    }

    /// A `Keyspace` wrapper that reports `dst` as wrong-type, to exercise
    /// the "type-check dst before mutating src" ordering in `smove`.
    struct WrongTypeAt<'a> {
        inner: &'a mut MemoryKeyspace,
        wrong_type_key: &'static [u8],
    }

    impl crate::keyspace::Keyspace for WrongTypeAt<'_> {
        fn get(&self, key: &[u8]) -> Result<Option<&SetObject>, SetError> {
            if key == self.wrong_type_key {
                return Err(SetError::WrongType);
            }
            self.inner.get(key)
        }
        fn get_mut(&mut self, key: &[u8]) -> Result<Option<&mut SetObject>, SetError> {
            if key == self.wrong_type_key {
                return Err(SetError::WrongType);
            }
            self.inner.get_mut(key)
        }
        fn insert(&mut self, key: &[u8], value: SetObject) {
            self.inner.insert(key, value)
        }
        fn remove(&mut self, key: &[u8]) {
            self.inner.remove(key)
        }
        fn contains(&self, key: &[u8]) -> bool {
            self.inner.contains(key)
        }
    }

    #[test]
    fn smove_wrong_type_dst_aborts_before_touching_src() {
        let mut backing = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg(512);
        sadd(&mut backing, &mut n, &c, b"src", &values(&["x", "y"])).unwrap();
        let before = n.events.len();

        let mut ks = WrongTypeAt {
            inner: &mut backing,
            wrong_type_key: b"dst",
        };
        assert_eq!(
            smove(&mut ks, &mut n, &c, b"src", b"dst", &Value::from("x")).unwrap_err(),
            SetError::WrongType
        );
        assert_eq!(n.events.len(), before, "no events before dst's type is checked");
        assert!(sismember(&backing, b"src", &Value::from("x")).unwrap(), "src must be untouched");
        assert!(sismember(&backing, b"src", &Value::from("y")).unwrap());
    }

    #[test]
    fn smove_src_equals_dst_is_a_pure_read() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg(512);
        sadd(&mut ks, &mut n, &c, b"s", &values(&["1"])).unwrap();
        let before = n.events.len();
        assert!(smove(&mut ks, &mut n, &c, b"s", b"s", &Value::from("1")).unwrap());
        assert!(!smove(&mut ks, &mut n, &c, b"s", b"s", &Value::from("9")).unwrap());
        assert_eq!(n.events.len(), before);
    }

    #[test]
    fn spop_rewrites_to_deterministic_srem() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let mut r = RecordingReplicator::new();
        let c = cfg(512);
        sadd(&mut ks, &mut n, &c, b"s", &values(&["1"])).unwrap();
        let popped = spop(&mut ks, &mut n, &mut r, b"s").unwrap().unwrap();
        assert_eq!(popped, Element::Int(1));
        assert!(!r.suppressed, "rewrite alone must carry the SREM, not a suppressed original");
        assert_eq!(r.rewritten.unwrap()[0].as_bytes(), b"SREM");
        assert!(!ks.contains(b"s"));
    }

    #[test]
    fn scenario_s4_spop_count_rebuild_remainder_strategy() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let mut r = RecordingReplicator::new();
        let c = cfg(512);
        let big: Vec<Value> = (1..=100).map(|i| Value::from_i64(i)).collect();
        sadd(&mut ks, &mut n, &c, b"big", &big).unwrap();

        let popped = spop_count(&mut ks, &mut n, &mut r, &c, b"big", 95).unwrap();
        assert_eq!(popped.len(), 95);
        assert_eq!(ks.get(b"big").unwrap().unwrap().len(), 5);
        assert_eq!(r.propagated.len(), 95);
        assert!(r.propagated.iter().all(|argv| argv[0].as_bytes() == b"SREM"));
        assert!(r.suppressed);
        assert!(r.rewritten.is_none());
    }

    #[test]
    fn spop_count_covering_whole_set_deletes_key() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let mut r = RecordingReplicator::new();
        let c = cfg(512);
        sadd(&mut ks, &mut n, &c, b"s", &values(&["1", "2", "3"])).unwrap();
        let popped = spop_count(&mut ks, &mut n, &mut r, &c, b"s", 10).unwrap();
        assert_eq!(popped.len(), 3);
        assert!(!ks.contains(b"s"));
        assert_eq!(r.propagated.len(), 1);
        assert_eq!(r.propagated[0][0].as_bytes(), b"DEL");
    }

    #[test]
    fn spop_count_rejects_negative_as_out_of_range() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let mut r = NullReplicator;
        let c = cfg(512);
        assert_eq!(
            spop_count(&mut ks, &mut n, &mut r, &c, b"missing", -1).unwrap_err(),
            SetError::OutOfRange
        );
    }

    #[test]
    fn srandmember_count_negative_allows_repetition() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg(512);
        sadd(&mut ks, &mut n, &c, b"s", &values(&["1"])).unwrap();
        let drawn = srandmember_count(&ks, b"s", -5).unwrap();
        assert_eq!(drawn.len(), 5);
        assert!(drawn.iter().all(|e| *e == Element::Int(1)));
    }

    #[test]
    fn srandmember_count_non_negative_never_repeats() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg(512);
        sadd(&mut ks, &mut n, &c, b"s", &values(&["1", "2", "3", "4", "5"])).unwrap();
        let drawn = srandmember_count(&ks, b"s", 3).unwrap();
        assert_eq!(drawn.len(), 3);
        let mut uniq = drawn.clone();
        uniq.sort_by_key(|e| e.to_value().as_bytes().to_vec());
        uniq.dedup();
        assert_eq!(uniq.len(), 3);
        assert_eq!(ks.get(b"s").unwrap().unwrap().len(), 5, "must not mutate source");
    }

    #[test]
    fn srandmemberstore_replaces_destination() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg(512);
        sadd(&mut ks, &mut n, &c, b"s", &values(&["1", "2", "3"])).unwrap();
        sadd(&mut ks, &mut n, &c, b"dst", &values(&["old"])).unwrap();
        let size = srandmemberstore(&mut ks, &mut n, &c, b"s", 2, b"dst").unwrap();
        assert_eq!(size, 2);
        assert!(!sismember(&ks, b"dst", &Value::from("old")).unwrap());
    }
}
