#[cfg(not(feature = "fast_hash"))]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "fast_hash")]
pub type CustomHashMap<K, V> = hashbrown::HashMap<K, V>;
#[cfg(feature = "fast_hash")]
pub type CustomHashSet<K> = hashbrown::HashSet<K>;

// default implementations
#[cfg(not(feature = "fast_hash"))]
pub type CustomHashMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "fast_hash"))]
pub type CustomHashSet<K> = HashSet<K>;
