/// Keyboard-style cursor over a list laid out in `columns` columns.
///
/// Any move with nothing selected selects the first entry. Horizontal moves
/// wrap around the whole list; vertical moves wrap within the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveSelection {
    index: Option<usize>,
}

impl ActiveSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Forget the cursor, e.g. after the underlying list changed.
    pub fn reset(&mut self) {
        self.index = None;
    }

    /// Pointer selection. Out-of-range indices reset the cursor.
    pub fn select(&mut self, index: usize, len: usize) {
        self.index = (index < len).then_some(index);
    }

    fn start_or(&mut self, len: usize, step: impl FnOnce(usize) -> usize) -> Option<usize> {
        if len == 0 {
            self.index = None;
            return None;
        }
        self.index = Some(match self.index {
            Some(current) if current < len => step(current),
            _ => 0,
        });
        self.index
    }

    pub fn move_next(&mut self, len: usize) -> Option<usize> {
        self.start_or(len, |current| (current + 1) % len)
    }

    pub fn move_previous(&mut self, len: usize) -> Option<usize> {
        self.start_or(len, |current| current.checked_sub(1).unwrap_or(len - 1))
    }

    pub fn move_down(&mut self, len: usize, columns: usize) -> Option<usize> {
        let columns = columns.max(1);
        self.start_or(len, |current| {
            let below = current + columns;
            if below < len {
                below
            } else {
                (current % columns).min(len - 1)
            }
        })
    }

    pub fn move_up(&mut self, len: usize, columns: usize) -> Option<usize> {
        let columns = columns.max(1);
        self.start_or(len, |current| {
            if let Some(above) = current.checked_sub(columns) {
                return above;
            }
            // Bottom-most cell of the same column.
            let column = current % columns;
            let mut last = (len - 1) - (len - 1) % columns + column;
            while last >= len {
                last -= columns;
            }
            last
        })
    }
}
