use crate::error::{LarkError, LarkResult};
use crate::value::{PairId, StrId, Value};

/// A single cons cell on the heap. Mutable in place, so destructive list
/// operations can create shared substructure.
pub struct ConsCell {
    pub car: Value,
    pub cdr: Value,
}

/// Arena of cons cells plus the string arena. All pairs are allocated here;
/// PairId is an index into `cells`. Cells live as long as the heap — there
/// is no collector, the host's ownership of the arena is the lifetime story.
pub struct Heap {
    cells: Vec<ConsCell>,
    strings: Vec<String>,
    capacity: usize,
}

impl Heap {
    pub fn new(capacity: usize) -> Self {
        Heap {
            cells: Vec::with_capacity(1024),
            strings: Vec::new(),
            capacity,
        }
    }

    /// Allocate a new cons cell. Returns Err(HeapOverflow) if capacity is
    /// exceeded.
    pub fn alloc(&mut self, car: Value, cdr: Value) -> LarkResult<PairId> {
        if self.cells.len() >= self.capacity {
            return Err(LarkError::HeapOverflow);
        }
        let id = PairId(self.cells.len() as u32);
        self.cells.push(ConsCell { car, cdr });
        Ok(id)
    }

    /// Allocate a string in the string arena.
    pub fn alloc_str(&mut self, s: String) -> StrId {
        let id = StrId(self.strings.len() as u32);
        self.strings.push(s);
        id
    }

    /// Content of an allocated string.
    pub fn str_content(&self, id: StrId) -> &str {
        &self.strings[id.0 as usize]
    }

    #[inline]
    pub fn car(&self, id: PairId) -> Value {
        self.cells[id.0 as usize].car
    }

    #[inline]
    pub fn cdr(&self, id: PairId) -> Value {
        self.cells[id.0 as usize].cdr
    }

    #[inline]
    pub fn set_car(&mut self, id: PairId, val: Value) {
        self.cells[id.0 as usize].car = val;
    }

    #[inline]
    pub fn set_cdr(&mut self, id: PairId, val: Value) {
        self.cells[id.0 as usize].cdr = val;
    }

    /// car of a value: the car slot of a pair, or nil of nil.
    pub fn car_val(&self, val: Value) -> LarkResult<Value> {
        match val {
            Value::Nil => Ok(Value::Nil),
            Value::Pair(id) => Ok(self.car(id)),
            _ => Err(LarkError::TypeError("car of non-pair non-nil atom".into())),
        }
    }

    /// cdr of a value: the cdr slot of a pair, or nil of nil.
    pub fn cdr_val(&self, val: Value) -> LarkResult<Value> {
        match val {
            Value::Nil => Ok(Value::Nil),
            Value::Pair(id) => Ok(self.cdr(id)),
            _ => Err(LarkError::TypeError("cdr of non-pair non-nil atom".into())),
        }
    }

    // The four standard two-level accessors.

    pub fn caar(&self, val: Value) -> LarkResult<Value> {
        let a = self.car_val(val)?;
        self.car_val(a)
    }

    pub fn cadr(&self, val: Value) -> LarkResult<Value> {
        let d = self.cdr_val(val)?;
        self.car_val(d)
    }

    pub fn cdar(&self, val: Value) -> LarkResult<Value> {
        let a = self.car_val(val)?;
        self.cdr_val(a)
    }

    pub fn cddr(&self, val: Value) -> LarkResult<Value> {
        let d = self.cdr_val(val)?;
        self.cdr_val(d)
    }

    /// Build a proper list from a slice of values.
    pub fn list(&mut self, values: &[Value]) -> LarkResult<Value> {
        let mut result = Value::Nil;
        for &val in values.iter().rev() {
            let pair = self.alloc(val, result)?;
            result = Value::Pair(pair);
        }
        Ok(result)
    }

    /// Returns true if this value is a proper list.
    pub fn is_proper_list(&self, val: Value) -> bool {
        let mut current = val;
        loop {
            match current {
                Value::Nil => return true,
                Value::Pair(id) => current = self.cdr(id),
                _ => return false,
            }
        }
    }

    /// Collect a proper list into a Vec. Returns None if not a proper list.
    pub fn list_to_vec(&self, val: Value) -> Option<Vec<Value>> {
        let mut result = Vec::new();
        let mut current = val;
        loop {
            match current {
                Value::Nil => return Some(result),
                Value::Pair(id) => {
                    result.push(self.car(id));
                    current = self.cdr(id);
                }
                _ => return None,
            }
        }
    }

    /// The last cell of a non-empty list.
    pub fn last(&self, val: Value) -> LarkResult<PairId> {
        let mut id = val
            .as_pair()
            .ok_or_else(|| LarkError::TypeError("last of a non-pair".into()))?;
        while let Value::Pair(next) = self.cdr(id) {
            id = next;
        }
        Ok(id)
    }

    /// Copying reverse of a proper list.
    pub fn reverse(&mut self, val: Value) -> LarkResult<Value> {
        let mut result = Value::Nil;
        let mut current = val;
        while let Value::Pair(id) = current {
            let pair = self.alloc(self.car(id), result)?;
            result = Value::Pair(pair);
            current = self.cdr(id);
        }
        if !current.is_nil() {
            return Err(LarkError::TypeError("reverse of an improper list".into()));
        }
        Ok(result)
    }

    /// Copying append: a fresh spine for `x`, sharing `y` as the tail.
    pub fn append(&mut self, x: Value, y: Value) -> LarkResult<Value> {
        let items = self
            .list_to_vec(x)
            .ok_or_else(|| LarkError::TypeError("append of an improper list".into()))?;
        let mut result = y;
        for &val in items.iter().rev() {
            let pair = self.alloc(val, result)?;
            result = Value::Pair(pair);
        }
        Ok(result)
    }

    /// Destructive concatenation: splices `y` onto the last cell of `x`.
    /// The result shares every cell of both arguments.
    pub fn nconc(&mut self, x: Value, y: Value) -> LarkResult<Value> {
        if x.is_nil() {
            return Ok(y);
        }
        let tail = self.last(x)?;
        self.set_cdr(tail, y);
        Ok(x)
    }

    /// Map a fallible function over a proper list, building a new list.
    pub fn map<F>(&mut self, list: Value, mut f: F) -> LarkResult<Value>
    where
        F: FnMut(&mut Heap, Value) -> LarkResult<Value>,
    {
        let items = self
            .list_to_vec(list)
            .ok_or_else(|| LarkError::TypeError("map over an improper list".into()))?;
        let mut mapped = Vec::with_capacity(items.len());
        for item in items {
            mapped.push(f(self, item)?);
        }
        self.list(&mapped)
    }

    /// Structural equality: pairs compare slot-wise, strings by content,
    /// everything else by handle identity.
    pub fn deep_eq(&self, a: Value, b: Value) -> bool {
        match (a, b) {
            (Value::Str(x), Value::Str(y)) => self.str_content(x) == self.str_content(y),
            (Value::Pair(x), Value::Pair(y)) => {
                self.deep_eq(self.car(x), self.car(y)) && self.deep_eq(self.cdr(x), self.cdr(y))
            }
            _ => a == b,
        }
    }

    /// Number of allocated cells.
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }
}
