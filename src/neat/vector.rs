#[derive(Copy, Clone, Debug)]
pub enum AlignedPair<'a, T> {
    HasBoth(&'a T, &'a T),
    HasLeft(&'a T),
    HasRight(&'a T),
}

/// Merge-walks two slices that are both sorted by `get_id`, pairing up elements
/// with equal ids and calling `map` once per id in ascending order.
pub fn align<'a, T, I, F, M>(v1: &'a [T], v2: &'a [T], get_id: F, mut map: M)
where
    I: PartialOrd,
    F: Fn(&T) -> I,
    M: FnMut(AlignedPair<'a, T>),
{
    let n1 = v1.len();
    let n2 = v2.len();
    let mut i1 = 0;
    let mut i2 = 0;

    while i1 < n1 || i2 < n2 {
        if i1 < n1 {
            let x1 = &v1[i1];
            if i2 < n2 {
                //still processing v1 and v2
                let x2 = &v2[i2];
                let id1 = get_id(x1);
                let id2 = get_id(x2);
                if id1 == id2 {
                    map(AlignedPair::HasBoth(x1, x2));
                    i1 += 1;
                    i2 += 1;
                } else if id1 < id2 {
                    map(AlignedPair::HasLeft(x1));
                    i1 += 1;
                } else {
                    map(AlignedPair::HasRight(x2));
                    i2 += 1;
                }
            } else {
                //still processing v1 but finished with v2
                map(AlignedPair::HasLeft(x1));
                i1 += 1;
            }
        } else {
            //finished processing v1 but still busy with v2
            map(AlignedPair::HasRight(&v2[i2]));
            i2 += 1;
        }
    }
}

/// Like [`align`], collecting every `Some` produced by `map`.
pub fn align_filter_map<'a, T, I, R, F, M>(v1: &'a [T], v2: &'a [T], get_id: F, mut map: M) -> Vec<R>
where
    I: PartialOrd,
    F: Fn(&T) -> I,
    M: FnMut(AlignedPair<'a, T>) -> Option<R>,
{
    let mut res = Vec::with_capacity(std::cmp::max(v1.len(), v2.len()));
    align(v1, v2, get_id, |pair| {
        if let Some(r) = map(pair) {
            res.push(r);
        }
    });
    res
}
