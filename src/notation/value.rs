//! Atoms, sets and maps, and their RFC 7047 JSON encoding

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use serde_json::{json, Value};

use super::errors::{ValidationError, ValidationResult};
use super::row_uuid::RowUuid;
use crate::schema::{AtomicType, BaseType, ColumnType, ValueKind};

/// A single scalar value.
///
/// Reals compare by IEEE total order so atoms can live in ordered sets.
#[derive(Debug, Clone)]
pub enum Atom {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    String(String),
    Uuid(RowUuid),
}

impl Atom {
    pub fn atomic_type(&self) -> AtomicType {
        match self {
            Atom::Integer(_) => AtomicType::Integer,
            Atom::Real(_) => AtomicType::Real,
            Atom::Boolean(_) => AtomicType::Boolean,
            Atom::String(_) => AtomicType::String,
            Atom::Uuid(_) => AtomicType::Uuid,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Atom::Integer(_) => 0,
            Atom::Real(_) => 1,
            Atom::Boolean(_) => 2,
            Atom::String(_) => 3,
            Atom::Uuid(_) => 4,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Atom::Integer(v) => json!(v),
            Atom::Real(v) => json!(v),
            Atom::Boolean(v) => json!(v),
            Atom::String(v) => json!(v),
            Atom::Uuid(v) => v.to_json(),
        }
    }

    /// Decodes one atom of the given base type
    pub fn from_json(base: &BaseType, value: &Value) -> Option<Atom> {
        match base.atomic {
            AtomicType::Integer => value.as_i64().map(Atom::Integer),
            AtomicType::Real => value.as_f64().map(Atom::Real),
            AtomicType::Boolean => value.as_bool().map(Atom::Boolean),
            AtomicType::String => value.as_str().map(|s| Atom::String(s.to_string())),
            AtomicType::Uuid => RowUuid::from_json(value).map(Atom::Uuid),
        }
    }

    pub fn as_uuid(&self) -> Option<&RowUuid> {
        match self {
            Atom::Uuid(uuid) => Some(uuid),
            _ => None,
        }
    }

    fn map_uuid<F: FnMut(&RowUuid) -> RowUuid>(&self, f: &mut F) -> Atom {
        match self {
            Atom::Uuid(uuid) => Atom::Uuid(f(uuid)),
            other => other.clone(),
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Atom::Integer(a), Atom::Integer(b)) => a.cmp(b),
            (Atom::Real(a), Atom::Real(b)) => a.total_cmp(b),
            (Atom::Boolean(a), Atom::Boolean(b)) => a.cmp(b),
            (Atom::String(a), Atom::String(b)) => a.cmp(b),
            (Atom::Uuid(a), Atom::Uuid(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Atom::Integer(v) => v.hash(state),
            Atom::Real(v) => v.to_bits().hash(state),
            Atom::Boolean(v) => v.hash(state),
            Atom::String(v) => v.hash(state),
            Atom::Uuid(v) => v.hash(state),
        }
    }
}

/// The value of one column: an atom, a set of atoms or a map between atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datum {
    Atom(Atom),
    Set(BTreeSet<Atom>),
    Map(BTreeMap<Atom, Atom>),
}

impl Datum {
    pub fn kind(&self) -> ValueKind {
        match self {
            Datum::Atom(_) => ValueKind::Atom,
            Datum::Set(_) => ValueKind::Set,
            Datum::Map(_) => ValueKind::Map,
        }
    }

    /// Number of atoms (set) or pairs (map); 1 for a bare atom
    pub fn len(&self) -> usize {
        match self {
            Datum::Atom(_) => 1,
            Datum::Set(set) => set.len(),
            Datum::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn uuid(uuid: RowUuid) -> Datum {
        Datum::Atom(Atom::Uuid(uuid))
    }

    pub fn uuid_set<I: IntoIterator<Item = RowUuid>>(uuids: I) -> Datum {
        Datum::Set(uuids.into_iter().map(Atom::Uuid).collect())
    }

    /// Protocol encoding.
    ///
    /// A one-element set is written as its bare atom; any other set as
    /// `["set", [...]]`. Maps are always `["map", [[k, v], ...]]`.
    pub fn to_json(&self) -> Value {
        match self {
            Datum::Atom(atom) => atom.to_json(),
            Datum::Set(set) if set.len() == 1 => {
                set.iter().next().map(Atom::to_json).unwrap_or(Value::Null)
            }
            Datum::Set(set) => {
                let elements: Vec<Value> = set.iter().map(Atom::to_json).collect();
                json!(["set", elements])
            }
            Datum::Map(map) => {
                let pairs: Vec<Value> = map
                    .iter()
                    .map(|(k, v)| json!([k.to_json(), v.to_json()]))
                    .collect();
                json!(["map", pairs])
            }
        }
    }

    /// Decodes `value` as the given column type.
    ///
    /// A bare atom for a set column decodes as a one-element set.
    pub fn from_json(column: &str, column_type: &ColumnType, value: &Value) -> ValidationResult<Datum> {
        let undecodable = || ValidationError::Undecodable {
            column: column.to_string(),
            json: value.to_string(),
        };

        match column_type {
            ColumnType::Atom(base) => Atom::from_json(base, value)
                .map(Datum::Atom)
                .ok_or_else(undecodable),
            ColumnType::Set { key, .. } => {
                if let Some(elements) = tagged(value, "set") {
                    let mut set = BTreeSet::new();
                    for element in elements {
                        set.insert(Atom::from_json(key, element).ok_or_else(undecodable)?);
                    }
                    Ok(Datum::Set(set))
                } else {
                    let atom = Atom::from_json(key, value).ok_or_else(undecodable)?;
                    Ok(Datum::Set(BTreeSet::from([atom])))
                }
            }
            ColumnType::Map { key, value: val, .. } => {
                let pairs = tagged(value, "map").ok_or_else(undecodable)?;
                let mut map = BTreeMap::new();
                for pair in pairs {
                    let pair = pair.as_array().filter(|p| p.len() == 2).ok_or_else(undecodable)?;
                    let k = Atom::from_json(key, &pair[0]).ok_or_else(undecodable)?;
                    let v = Atom::from_json(val, &pair[1]).ok_or_else(undecodable)?;
                    map.insert(k, v);
                }
                Ok(Datum::Map(map))
            }
        }
    }

    /// Returns a copy with every uuid passed through `f`
    pub fn map_uuids<F: FnMut(&RowUuid) -> RowUuid>(&self, f: &mut F) -> Datum {
        match self {
            Datum::Atom(atom) => Datum::Atom(atom.map_uuid(f)),
            Datum::Set(set) => Datum::Set(set.iter().map(|a| a.map_uuid(&mut *f)).collect()),
            Datum::Map(map) => Datum::Map(
                map.iter()
                    .map(|(k, v)| (k.map_uuid(&mut *f), v.map_uuid(&mut *f)))
                    .collect(),
            ),
        }
    }

    /// Every uuid this datum mentions
    pub fn uuids(&self) -> Vec<&RowUuid> {
        match self {
            Datum::Atom(atom) => atom.as_uuid().into_iter().collect(),
            Datum::Set(set) => set.iter().filter_map(Atom::as_uuid).collect(),
            Datum::Map(map) => map
                .iter()
                .flat_map(|(k, v)| [k.as_uuid(), v.as_uuid()])
                .flatten()
                .collect(),
        }
    }
}

fn tagged<'a>(value: &'a Value, tag: &str) -> Option<&'a Vec<Value>> {
    let pair = value.as_array()?;
    if pair.len() == 2 && pair[0].as_str() == Some(tag) {
        pair[1].as_array()
    } else {
        None
    }
}

/// Rust values that are a single atom
pub trait AtomData: Sized {
    fn into_atom(self) -> Atom;
    fn from_atom(atom: &Atom) -> Option<Self>;
}

/// Rust values that can be stored in a column
pub trait ColumnData: Sized {
    fn into_datum(self) -> Datum;
    fn from_datum(datum: &Datum) -> Option<Self>;
}

macro_rules! atom_data {
    ($ty:ty, $variant:ident) => {
        impl AtomData for $ty {
            fn into_atom(self) -> Atom {
                Atom::$variant(self)
            }

            fn from_atom(atom: &Atom) -> Option<Self> {
                match atom {
                    Atom::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl ColumnData for $ty {
            fn into_datum(self) -> Datum {
                Datum::Atom(self.into_atom())
            }

            fn from_datum(datum: &Datum) -> Option<Self> {
                match datum {
                    Datum::Atom(atom) => Self::from_atom(atom),
                    _ => None,
                }
            }
        }
    };
}

atom_data!(i64, Integer);
atom_data!(f64, Real);
atom_data!(bool, Boolean);
atom_data!(String, String);
atom_data!(RowUuid, Uuid);

impl<T: AtomData + Ord> ColumnData for BTreeSet<T> {
    fn into_datum(self) -> Datum {
        Datum::Set(self.into_iter().map(AtomData::into_atom).collect())
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        match datum {
            Datum::Set(set) => set.iter().map(T::from_atom).collect(),
            _ => None,
        }
    }
}

impl<K: AtomData + Ord, V: AtomData> ColumnData for BTreeMap<K, V> {
    fn into_datum(self) -> Datum {
        Datum::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_atom(), v.into_atom()))
                .collect(),
        )
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        match datum {
            Datum::Map(map) => map
                .iter()
                .map(|(k, v)| Some((K::from_atom(k)?, V::from_atom(v)?)))
                .collect(),
            _ => None,
        }
    }
}

impl ColumnData for Datum {
    fn into_datum(self) -> Datum {
        self
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        Some(datum.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_set() -> ColumnType {
        ColumnType::Set {
            key: BaseType::new(AtomicType::String),
            min: 0,
            max: None,
        }
    }

    #[test]
    fn test_single_element_set_is_bare_atom() {
        let datum = BTreeSet::from(["OpenFlow13".to_string()]).into_datum();
        assert_eq!(datum.to_json(), json!("OpenFlow13"));
    }

    #[test]
    fn test_empty_and_multi_sets_are_tagged() {
        let empty = Datum::Set(BTreeSet::new());
        assert_eq!(empty.to_json(), json!(["set", []]));

        let two = BTreeSet::from([1i64, 2]).into_datum();
        assert_eq!(two.to_json(), json!(["set", [1, 2]]));
    }

    #[test]
    fn test_map_is_tagged_pair_list() {
        let map = BTreeMap::from([("k".to_string(), "v".to_string())]).into_datum();
        assert_eq!(map.to_json(), json!(["map", [["k", "v"]]]));
    }

    #[test]
    fn test_bare_atom_decodes_as_singleton_set() {
        let datum = Datum::from_json("protocols", &string_set(), &json!("OpenFlow10")).unwrap();
        assert_eq!(datum, BTreeSet::from(["OpenFlow10".to_string()]).into_datum());
    }

    #[test]
    fn test_decode_rejects_wrong_base_type() {
        let err = Datum::from_json("protocols", &string_set(), &json!(["set", [1]])).unwrap_err();
        assert!(matches!(err, ValidationError::Undecodable { .. }));
    }

    #[test]
    fn test_decode_map() {
        let ty = ColumnType::Map {
            key: BaseType::new(AtomicType::String),
            value: BaseType::new(AtomicType::Integer),
            min: 0,
            max: None,
        };
        let datum = Datum::from_json("m", &ty, &json!(["map", [["a", 1], ["b", 2]]])).unwrap();
        let back: BTreeMap<String, i64> = ColumnData::from_datum(&datum).unwrap();
        assert_eq!(back.get("b"), Some(&2));
    }

    #[test]
    fn test_real_atoms_are_totally_ordered() {
        let set: BTreeSet<Atom> = [Atom::Real(2.5), Atom::Real(-1.0), Atom::Real(2.5)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next(), Some(&Atom::Real(-1.0)));
    }

    #[test]
    fn test_map_uuids_rewrites_named() {
        let datum = Datum::uuid_set([RowUuid::named("row1"), RowUuid::named("row2")]);
        let renamed = datum.map_uuids(&mut |u| match u.as_named() {
            Some("row1") => RowUuid::named("row7"),
            _ => u.clone(),
        });
        let names: Vec<_> = renamed.uuids().iter().filter_map(|u| u.as_named()).collect();
        assert_eq!(names, vec!["row2", "row7"]);
    }

    #[test]
    fn test_column_data_kind_is_strict() {
        let atom = "br0".to_string().into_datum();
        assert_eq!(<BTreeSet<String>>::from_datum(&atom), None);
        assert_eq!(String::from_datum(&atom), Some("br0".to_string()));
    }
}
