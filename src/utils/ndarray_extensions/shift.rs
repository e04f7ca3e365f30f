use ndarray::{Array, ArrayBase, Axis, Data, RemoveAxis};

pub(crate) trait Shift<A, D> {
    /// Moves every entry `by` steps forward along `axis`, the head repeats the first entry.
    fn shift(&self, by: usize, axis: Axis) -> Array<A, D>;

    /// Predecessor of every entry along `axis`. The first entry has none and takes the second one instead.
    fn lag(&self, axis: Axis) -> Array<A, D>;
}

impl<A, S, D> Shift<A, D> for ArrayBase<S, D>
where
    A: Copy,
    S: Data<Elem = A>,
    D: RemoveAxis,
{
    fn shift(&self, by: usize, axis: Axis) -> Array<A, D> {
        let loc: Vec<usize> = (0..self.len_of(axis)).map(|i| i.saturating_sub(by)).collect();
        self.select(axis, &loc)
    }

    fn lag(&self, axis: Axis) -> Array<A, D> {
        let len = self.len_of(axis);
        let loc: Vec<usize> = (0..len)
            .map(|i| match i {
                0 => 1.min(len - 1),
                _ => i - 1,
            })
            .collect();
        self.select(axis, &loc)
    }
}
