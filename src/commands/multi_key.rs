//! Multi-key set algebra (§4.5): `SINTER`/`SINTERSTORE`,
//! `SUNION`/`SUNIONSTORE`, `SDIFF`/`SDIFFSTORE` over an ordered list of
//! N ≥ 1 source keys, each picking its working algorithm by input
//! cardinality.

use crate::config::SetConfig;
use crate::error::SetError;
use crate::events::{EventKind, Notifier};
use crate::keyspace::Keyspace;
use crate::object::{Element, SetObject};

use super::store_result;

/// Look every key up; `None` as soon as one is missing (the caller
/// decides what a missing source means for its own operation).
fn gather_present<'k>(
    ks: &'k dyn Keyspace,
    keys: &[&[u8]],
) -> Result<Option<Vec<&'k SetObject>>, SetError> {
    let mut objs = Vec::with_capacity(keys.len());
    for &k in keys {
        match ks.get(k)? {
            Some(obj) => objs.push(obj),
            None => return Ok(None),
        }
    }
    Ok(Some(objs))
}

/// Assemble a fresh `SetObject` from reply elements, for the `*STORE`
/// variants which need an owned destination value rather than a reply
/// stream.
fn build_result(elements: Vec<Element>, config: &SetConfig) -> SetObject {
    let mut result = SetObject::empty();
    for elem in elements {
        result.add(elem.to_value(), config);
    }
    result
}

/// A missing source key makes the whole intersection empty (§4.5).
fn inter_object(
    ks: &dyn Keyspace,
    config: &SetConfig,
    keys: &[&[u8]],
) -> Result<SetObject, SetError> {
    let Some(mut objs) = gather_present(ks, keys)? else {
        return Ok(SetObject::empty());
    };
    // Ascending cardinality: probe from the smallest set outward.
    objs.sort_by_key(|o| o.len());
    let (smallest, rest) = objs
        .split_first()
        .expect("arity enforced upstream: at least one source key");

    let mut result = Vec::new();
    'outer: for elem in smallest.iter() {
        for other in rest {
            if !other.contains_element(&elem) {
                continue 'outer;
            }
        }
        result.push(elem);
    }
    Ok(build_result(result, config))
}

/// `SINTER k1..kn`.
pub fn sinter(ks: &dyn Keyspace, keys: &[&[u8]]) -> Result<Vec<Element>, SetError> {
    Ok(inter_object(ks, &SetConfig::default(), keys)?.iter().collect())
}

/// `SINTERSTORE dst k1..kn`.
pub fn sinterstore(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    config: &SetConfig,
    dst: &[u8],
    keys: &[&[u8]],
) -> Result<u64, SetError> {
    let result = inter_object(ks, config, keys)?;
    Ok(store_result(ks, notifier, dst, result, EventKind::SInterStore))
}

/// A missing source key is simply an empty contribution (§4.5).
fn union_object(
    ks: &dyn Keyspace,
    config: &SetConfig,
    keys: &[&[u8]],
) -> Result<SetObject, SetError> {
    let mut result = SetObject::empty();
    for &k in keys {
        if let Some(obj) = ks.get(k)? {
            for elem in obj.iter() {
                result.add(elem.to_value(), config);
            }
        }
    }
    Ok(result)
}

/// `SUNION k1..kn`.
pub fn sunion(ks: &dyn Keyspace, keys: &[&[u8]]) -> Result<Vec<Element>, SetError> {
    Ok(union_object(ks, &SetConfig::default(), keys)?.iter().collect())
}

/// `SUNIONSTORE dst k1..kn`.
pub fn sunionstore(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    config: &SetConfig,
    dst: &[u8],
    keys: &[&[u8]],
) -> Result<u64, SetError> {
    let result = union_object(ks, config, keys)?;
    Ok(store_result(ks, notifier, dst, result, EventKind::SUnionStore))
}

/// `sources[0] \ (sources[1] ∪ .. ∪ sources[n-1])`. A missing
/// `sources[0]` makes the whole difference empty; a missing later
/// source contributes nothing to subtract.
///
/// Picks between probing `sources[0]` against every other source
/// (Algorithm A, cost `O(n0 * N)`) and copying `sources[0]` then
/// subtracting every other source's elements from it (Algorithm B,
/// cost `O(sum(ni))`), by comparing `work_a = (n0 * N) / 2` against
/// `work_b = sum(ni)` including `n0` itself — A is biased toward
/// because its constant factor is lower when overlap is high.
fn diff_object(
    ks: &dyn Keyspace,
    config: &SetConfig,
    keys: &[&[u8]],
) -> Result<SetObject, SetError> {
    let (&first_key, rest_keys) = keys
        .split_first()
        .expect("arity enforced upstream: at least one source key");
    let first = match ks.get(first_key)? {
        Some(obj) => obj,
        None => return Ok(SetObject::empty()),
    };

    let mut others = Vec::with_capacity(rest_keys.len());
    for &k in rest_keys {
        others.push(ks.get(k)?);
    }

    let n0 = first.len() as u64;
    let n = keys.len() as u64;
    let others_total: u64 = others
        .iter()
        .copied()
        .flatten()
        .map(|o| o.len() as u64)
        .sum();
    let work_a = (n0 * n) / 2;
    let work_b = n0 + others_total;

    if work_a <= work_b {
        // Algorithm A: probe. Sort the other sources by descending
        // cardinality so a probe is most likely to short-circuit early.
        let mut order = others.clone();
        order.sort_by_key(|o| std::cmp::Reverse(o.map_or(0, SetObject::len)));

        let mut result = Vec::new();
        'outer: for elem in first.iter() {
            for other in &order {
                if let Some(o) = other {
                    if o.contains_element(&elem) {
                        continue 'outer;
                    }
                }
            }
            result.push(elem);
        }
        Ok(build_result(result, config))
    } else {
        // Algorithm B: subtract.
        let mut result = SetObject::empty();
        for elem in first.iter() {
            result.add(elem.to_value(), config);
        }
        'others: for other in others.iter().copied().flatten() {
            for elem in other.iter() {
                result.remove(&elem.to_value());
                if result.is_empty() {
                    break 'others;
                }
            }
        }
        Ok(result)
    }
}

/// `SDIFF k1..kn`.
pub fn sdiff(ks: &dyn Keyspace, keys: &[&[u8]]) -> Result<Vec<Element>, SetError> {
    Ok(diff_object(ks, &SetConfig::default(), keys)?.iter().collect())
}

/// `SDIFFSTORE dst k1..kn`.
pub fn sdiffstore(
    ks: &mut dyn Keyspace,
    notifier: &mut dyn Notifier,
    config: &SetConfig,
    dst: &[u8],
    keys: &[&[u8]],
) -> Result<u64, SetError> {
    let result = diff_object(ks, config, keys)?;
    Ok(store_result(ks, notifier, dst, result, EventKind::SDiffStore))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::single_key::sadd;
    use crate::events::RecordingNotifier;
    use crate::keyspace::MemoryKeyspace;
    use crate::value::Value;

    fn cfg() -> SetConfig {
        SetConfig::default()
    }

    fn values(raw: &[&str]) -> Vec<Value> {
        raw.iter().map(|s| Value::from(*s)).collect()
    }

    fn membership(elements: &[Element]) -> Vec<Vec<u8>> {
        let mut out: Vec<Vec<u8>> = elements.iter().map(|e| e.to_value().as_bytes().to_vec()).collect();
        out.sort();
        out
    }

    #[test]
    fn scenario_s3_sinter_and_sinterstore() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg();
        sadd(&mut ks, &mut n, &c, b"a", &values(&["1", "2", "3", "4"])).unwrap();
        sadd(&mut ks, &mut n, &c, b"b", &values(&["3", "4", "5", "6"])).unwrap();

        let result = sinter(&ks, &[b"a", b"b"]).unwrap();
        assert_eq!(membership(&result), vec![b"3".to_vec(), b"4".to_vec()]);

        let size = sinterstore(&mut ks, &mut n, &c, b"dst", &[b"a", b"b"]).unwrap();
        assert_eq!(size, 2);
        let dst = ks.get(b"dst").unwrap().unwrap();
        assert_eq!(dst.len(), 2);
    }

    #[test]
    fn sinter_with_missing_source_is_empty_and_deletes_store_destination() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg();
        sadd(&mut ks, &mut n, &c, b"a", &values(&["1"])).unwrap();
        sadd(&mut ks, &mut n, &c, b"dst", &values(&["old"])).unwrap();

        assert!(sinter(&ks, &[b"a", b"missing"]).unwrap().is_empty());
        let size = sinterstore(&mut ks, &mut n, &c, b"dst", &[b"a", b"missing"]).unwrap();
        assert_eq!(size, 0);
        assert!(!ks.contains(b"dst"));
    }

    #[test]
    fn sunion_treats_missing_source_as_empty() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg();
        sadd(&mut ks, &mut n, &c, b"a", &values(&["1", "2"])).unwrap();
        let result = sunion(&ks, &[b"a", b"missing"]).unwrap();
        assert_eq!(membership(&result), vec![b"1".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn scenario_s5_sdiff_algorithm_a_selected() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg();
        sadd(&mut ks, &mut n, &c, b"a", &values(&["1", "2", "3"])).unwrap();
        sadd(&mut ks, &mut n, &c, b"b", &values(&["2"])).unwrap();
        sadd(&mut ks, &mut n, &c, b"c", &values(&["3"])).unwrap();

        let result = sdiff(&ks, &[b"a", b"b", b"c"]).unwrap();
        assert_eq!(membership(&result), vec![b"1".to_vec()]);
    }

    #[test]
    fn sdiffstore_deletes_empty_result_when_destination_existed() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg();
        sadd(&mut ks, &mut n, &c, b"a", &values(&["1"])).unwrap();
        sadd(&mut ks, &mut n, &c, b"b", &values(&["1"])).unwrap();
        sadd(&mut ks, &mut n, &c, b"dst", &values(&["old"])).unwrap();

        let size = sdiffstore(&mut ks, &mut n, &c, b"dst", &[b"a", b"b"]).unwrap();
        assert_eq!(size, 0);
        assert!(!ks.contains(b"dst"));
        assert!(n.kinds().contains(&EventKind::Del));
    }

    #[test]
    fn sdiff_subtract_algorithm_stops_once_result_is_empty() {
        let mut ks = MemoryKeyspace::new();
        let mut n = RecordingNotifier::new();
        let c = cfg();
        // n0 small, others large => work_b dominates => Algorithm B.
        sadd(&mut ks, &mut n, &c, b"a", &values(&["1"])).unwrap();
        sadd(
            &mut ks,
            &mut n,
            &c,
            b"b",
            &values(&["1", "2", "3", "4", "5", "6", "7", "8"]),
        )
        .unwrap();
        let result = sdiff(&ks, &[b"a", b"b"]).unwrap();
        assert!(result.is_empty());
    }
}
