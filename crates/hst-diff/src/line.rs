//! Line-level diff: Myers' O(ND) edit script grouped into hunks.

use bstr::BString;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Equal,
    Insert,
    Delete,
}

/// One step of an edit script. `old_index` is meaningful for `Equal` and
/// `Delete`, `new_index` for `Equal` and `Insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub op: EditOp,
    pub old_index: usize,
    pub new_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Context(BString),
    Addition(BString),
    Deletion(BString),
}

/// A run of changes with surrounding context. Starts are 1-based; a side
/// with no lines reports the line before the hunk, as `diff -u` does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

/// Number of unchanged lines shown around each change.
pub const DEFAULT_CONTEXT: usize = 3;

/// Split into lines, keeping the `\n` terminators. A final line without a
/// newline is still a line.
pub fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, &b) in data.iter().enumerate() {
        if b == b'\n' {
            lines.push(&data[start..=i]);
            start = i + 1;
        }
    }
    if start < data.len() {
        lines.push(&data[start..]);
    }
    lines
}

/// Shortest edit script turning `old` into `new`.
pub fn diff<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Edit> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let max = n + m;
    let offset = max + 1;
    let idx = |k: isize| (k + offset) as usize;

    let mut v = vec![0isize; (2 * max + 3) as usize];
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && v[idx(k - 1)] < v[idx(k + 1)]) {
                v[idx(k + 1)]
            } else {
                v[idx(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx(k)] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    let mut edits = Vec::with_capacity((n + m) as usize);
    let (mut x, mut y) = (n, m);
    for (d, v) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let k = x - y;
        let prev_k = if k == -d || (k != d && v[idx(k - 1)] < v[idx(k + 1)]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = if d == 0 { 0 } else { v[idx(prev_k)] };
        let prev_y = if d == 0 { 0 } else { prev_x - prev_k };

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits.push(Edit {
                op: EditOp::Equal,
                old_index: x as usize,
                new_index: y as usize,
            });
        }
        if d > 0 {
            let op = if x == prev_x { EditOp::Insert } else { EditOp::Delete };
            edits.push(Edit {
                op,
                old_index: prev_x as usize,
                new_index: prev_y as usize,
            });
            x = prev_x;
            y = prev_y;
        }
    }
    edits.reverse();
    edits
}

/// Group a line edit script into hunks with `context` lines around changes.
/// Changes separated by at most `2 * context` unchanged lines share a hunk.
pub fn hunks(old: &[&[u8]], new: &[&[u8]], edits: &[Edit], context: usize) -> Vec<Hunk> {
    let changes: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| e.op != EditOp::Equal)
        .map(|(i, _)| i)
        .collect();
    let Some(&first) = changes.first() else {
        return Vec::new();
    };

    let mut groups = vec![(first, first)];
    for &i in &changes[1..] {
        let last = groups.len() - 1;
        if i - groups[last].1 - 1 <= 2 * context {
            groups[last].1 = i;
        } else {
            groups.push((i, i));
        }
    }

    // Line positions before each edit.
    let mut old_pos = Vec::with_capacity(edits.len() + 1);
    let mut new_pos = Vec::with_capacity(edits.len() + 1);
    let (mut o, mut n) = (0, 0);
    for e in edits {
        old_pos.push(o);
        new_pos.push(n);
        match e.op {
            EditOp::Equal => {
                o += 1;
                n += 1;
            }
            EditOp::Delete => o += 1,
            EditOp::Insert => n += 1,
        }
    }

    groups
        .into_iter()
        .map(|(first, last)| {
            let start = first.saturating_sub(context);
            let end = (last + 1 + context).min(edits.len());
            let mut hunk = Hunk {
                old_start: old_pos[start],
                old_count: 0,
                new_start: new_pos[start],
                new_count: 0,
                lines: Vec::with_capacity(end - start),
            };
            for e in &edits[start..end] {
                match e.op {
                    EditOp::Equal => {
                        hunk.lines.push(DiffLine::Context(BString::from(old[e.old_index])));
                        hunk.old_count += 1;
                        hunk.new_count += 1;
                    }
                    EditOp::Delete => {
                        hunk.lines.push(DiffLine::Deletion(BString::from(old[e.old_index])));
                        hunk.old_count += 1;
                    }
                    EditOp::Insert => {
                        hunk.lines.push(DiffLine::Addition(BString::from(new[e.new_index])));
                        hunk.new_count += 1;
                    }
                }
            }
            if hunk.old_count > 0 {
                hunk.old_start += 1;
            }
            if hunk.new_count > 0 {
                hunk.new_start += 1;
            }
            hunk
        })
        .collect()
}

/// Diff two byte buffers line by line.
pub fn diff_lines(old: &[u8], new: &[u8], context: usize) -> Vec<Hunk> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let edits = diff(&old_lines, &new_lines);
    hunks(&old_lines, &new_lines, &edits, context)
}
