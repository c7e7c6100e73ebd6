use kiln::graphics::{MeshHandle, ShaderHandle, TextureHandle};
use slotmap::{DefaultKey, Key, KeyData, SlotMap};
use std::marker::PhantomData;

/// A handle type that can address a [`ResourcePool`].
pub trait ResourceHandle: Copy {
    fn from_raw(id: u64) -> Self;
    fn id(self) -> u64;
}

macro_rules! impl_resource_handle {
    ($($handle:ty),+) => {
        $(
            impl ResourceHandle for $handle {
                fn from_raw(id: u64) -> Self {
                    <$handle>::from_raw(id)
                }

                fn id(self) -> u64 {
                    <$handle>::id(self)
                }
            }
        )+
    };
}

impl_resource_handle!(TextureHandle, ShaderHandle, MeshHandle);

/// Resource table keyed by generation-checked handles.
///
/// A handle packs the slot index and its generation, so destroying a
/// resource never changes what other handles resolve to, and a destroyed
/// handle keeps resolving to nothing even after its slot is reused. Occupied
/// generations are odd, so no live handle is ever zero.
pub struct ResourcePool<H, T> {
    slots: SlotMap<DefaultKey, T>,
    _handle: PhantomData<H>,
}

impl<H: ResourceHandle, T> ResourcePool<H, T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::new(),
            _handle: PhantomData,
        }
    }

    /// Only ids this pool issued map to a key. `from_ffi` normalizes the
    /// version bits, so anything that doesn't survive the round trip is foreign.
    fn key(handle: H) -> Option<DefaultKey> {
        let id = handle.id();
        let key: DefaultKey = KeyData::from_ffi(id).into();
        (id != 0 && key.data().as_ffi() == id).then_some(key)
    }

    pub fn insert(&mut self, resource: T) -> H {
        let key = self.slots.insert(resource);
        H::from_raw(key.data().as_ffi())
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        self.slots.get(Self::key(handle)?)
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slots.get_mut(Self::key(handle)?)
    }

    pub fn remove(&mut self, handle: H) -> Option<T> {
        self.slots.remove(Self::key(handle)?)
    }

    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.values_mut()
    }
}

impl<H: ResourceHandle, T> Default for ResourcePool<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_survive_earlier_removals() {
        let mut pool = ResourcePool::<TextureHandle, &str>::new();
        let handles: Vec<_> = ["a", "b", "c", "d"].into_iter().map(|v| pool.insert(v)).collect();
        assert!(handles.iter().all(|h| h.is_valid()));

        assert_eq!(pool.remove(handles[0]), Some("a"));
        assert_eq!(pool.get(handles[1]), Some(&"b"));
        assert_eq!(pool.get(handles[2]), Some(&"c"));
        assert_eq!(pool.get(handles[3]), Some(&"d"));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn stale_handles_do_not_resolve_after_reuse() {
        let mut pool = ResourcePool::<MeshHandle, u32>::new();
        let first = pool.insert(1);
        pool.remove(first);
        let second = pool.insert(2);

        assert_ne!(first, second);
        assert_eq!(pool.get(first), None);
        assert_eq!(pool.get(second), Some(&2));
        assert_eq!(pool.remove(first), None);
    }

    #[test]
    fn ids_the_pool_never_issued_do_not_resolve() {
        let mut pool = ResourcePool::<TextureHandle, &str>::new();
        let live = pool.insert("live");
        let truncated = TextureHandle::from_raw(live.id() & 0xffff_ffff);
        let later_version = TextureHandle::from_raw(live.id() + (2 << 32));

        for forged in [truncated, later_version] {
            assert_ne!(forged, live);
            assert_eq!(pool.get(forged), None);
            assert!(!pool.contains(forged));
            assert_eq!(pool.remove(forged), None);
        }
        assert_eq!(pool.get(live), Some(&"live"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn invalid_handle_resolves_to_nothing() {
        let mut pool = ResourcePool::<ShaderHandle, u32>::new();
        pool.insert(7);
        assert_eq!(pool.get(ShaderHandle::INVALID), None);
        assert_eq!(pool.remove(ShaderHandle::default()), None);
        assert_eq!(pool.len(), 1);
    }
}
