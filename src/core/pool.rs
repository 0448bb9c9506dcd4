//! 稳定索引池
//!
//! 为高频创建/销毁的瞬态实体（粒子等）提供固定身份的密集存储：
//!
//! - `insert` / `remove` 均为 O(1)，移除采用 swap-with-last 策略
//! - 元素密集存放，线性迭代无空洞
//! - 句柄带世代校验，过期句柄不会误命中复用后的槽位
//!
//! 移除元素 X 时，最后一个活跃元素 Y 会被搬进 X 的存储槽位，
//! 因此外部代码只能缓存句柄，不能跨移除操作缓存原始槽位下标。
//! 迭代顺序仅在两次变更之间稳定；迭代期间插入/移除是未定义行为，
//! 调用方必须先做快照或延后变更。

/// 池元素句柄
///
/// 由 `index`（槽位表下标）和 `generation`（世代号）组成。
/// 槽位被复用时世代号递增，旧句柄随之失效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

/// 槽位表项：活跃时记录密集数组下标，空闲时串入空闲链
#[derive(Debug, Clone, Copy)]
enum SlotState {
    Live { dense: u32 },
    Free { next_free: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    state: SlotState,
}

/// 空闲链表终止标记
const FREE_END: u32 = u32::MAX;

/// 稳定索引池
///
/// 元素存放在密集数组 `dense` 中；`slots` 提供句柄到密集下标的
/// 间接层，保证句柄在元素整个生命周期内有效。
#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Slot>,
    free_head: u32,
    dense: Vec<T>,
    /// 与`dense`平行：每个元素所属的槽位下标
    dense_slot: Vec<u32>,
    /// 与`dense`平行：插入序号，用于跨帧稳定排序
    dense_seq: Vec<u64>,
    next_seq: u64,
}

impl<T> Pool<T> {
    /// 创建空池
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: FREE_END,
            dense: Vec::new(),
            dense_slot: Vec::new(),
            dense_seq: Vec::new(),
            next_seq: 0,
        }
    }

    /// 创建预分配容量的池
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: FREE_END,
            dense: Vec::with_capacity(capacity),
            dense_slot: Vec::with_capacity(capacity),
            dense_seq: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    /// 当前活跃元素数量
    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// 池是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// 插入新元素并返回其句柄
    ///
    /// 优先复用空闲槽位；没有空闲槽位时追加新槽位（摊销O(1)）。
    pub fn insert(&mut self, value: T) -> PoolHandle {
        let dense_index = self.dense.len() as u32;
        let slot_index = if self.free_head != FREE_END {
            let slot_index = self.free_head;
            let slot = &mut self.slots[slot_index as usize];
            let SlotState::Free { next_free } = slot.state else {
                unreachable!("free list head points at a live slot");
            };
            self.free_head = next_free;
            slot.state = SlotState::Live { dense: dense_index };
            slot_index
        } else {
            self.slots.push(Slot {
                generation: 0,
                state: SlotState::Live { dense: dense_index },
            });
            (self.slots.len() - 1) as u32
        };

        self.dense.push(value);
        self.dense_slot.push(slot_index);
        self.dense_seq.push(self.next_seq);
        self.next_seq += 1;

        PoolHandle {
            index: slot_index,
            generation: self.slots[slot_index as usize].generation,
        }
    }

    /// 按句柄移除元素并返回它
    ///
    /// 最后一个活跃元素被搬进被移除元素的槽位（swap-with-last），
    /// 其槽位表项同步更新，句柄不受影响。
    ///
    /// # Panics
    ///
    /// 对已移除或外来句柄调用属于编程错误，触发断言；
    /// 引擎在此没有优雅恢复的用例，继续执行只会破坏池不变量。
    pub fn remove(&mut self, handle: PoolHandle) -> T {
        let dense_index = match self.resolve(handle) {
            Some(dense_index) => dense_index,
            None => panic!("Pool::remove called with a stale or foreign handle"),
        };

        let last = self.dense.len() - 1;
        if dense_index != last {
            self.dense.swap(dense_index, last);
            self.dense_slot.swap(dense_index, last);
            self.dense_seq.swap(dense_index, last);
            // 被搬动元素的槽位表项指向新的密集下标
            let moved_slot = self.dense_slot[dense_index];
            self.slots[moved_slot as usize].state = SlotState::Live {
                dense: dense_index as u32,
            };
        }

        let value = match self.dense.pop() {
            Some(value) => value,
            None => unreachable!("dense array empty after a successful resolve"),
        };
        self.dense_slot.pop();
        self.dense_seq.pop();

        let slot = &mut self.slots[handle.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.state = SlotState::Free {
            next_free: self.free_head,
        };
        self.free_head = handle.index;

        value
    }

    /// 句柄是否仍指向活跃元素
    #[inline]
    pub fn contains(&self, handle: PoolHandle) -> bool {
        self.resolve(handle).is_some()
    }

    /// 按句柄访问元素
    ///
    /// 过期句柄返回`None`。
    #[inline]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.resolve(handle).map(|dense| &self.dense[dense])
    }

    /// 按句柄可变访问元素
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.resolve(handle).map(move |dense| &mut self.dense[dense])
    }

    /// 元素的插入序号
    ///
    /// 全池单调递增，元素存活期间不变，可作为稳定排序的次级键。
    #[inline]
    pub fn sequence(&self, handle: PoolHandle) -> Option<u64> {
        self.resolve(handle).map(|dense| self.dense_seq[dense])
    }

    /// 线性迭代所有活跃元素
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.dense.iter()
    }

    /// 线性可变迭代所有活跃元素
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.dense.iter_mut()
    }

    /// 迭代（句柄, 插入序号, 元素）三元组
    pub fn iter_entries(&self) -> impl Iterator<Item = (PoolHandle, u64, &T)> {
        self.dense.iter().enumerate().map(move |(dense, value)| {
            let slot_index = self.dense_slot[dense];
            let handle = PoolHandle {
                index: slot_index,
                generation: self.slots[slot_index as usize].generation,
            };
            (handle, self.dense_seq[dense], value)
        })
    }

    /// 清空池，使所有存量句柄失效
    pub fn clear(&mut self) {
        self.dense.clear();
        self.dense_slot.clear();
        self.dense_seq.clear();
        self.free_head = FREE_END;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.generation = slot.generation.wrapping_add(1);
            slot.state = SlotState::Free {
                next_free: self.free_head,
            };
            self.free_head = index as u32;
        }
    }

    /// 解析句柄为密集数组下标
    #[inline]
    fn resolve(&self, handle: PoolHandle) -> Option<usize> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        match slot.state {
            SlotState::Live { dense } => Some(dense as usize),
            SlotState::Free { .. } => None,
        }
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}
