//! The dictionary index: owns the word table and answers "which words of
//! length L match these fixed letters" queries fast enough to drive
//! millions of calls per second from [`crate::search`].
//!
//! Indexed by per-length posting lists, one per `(position, letter)` pair,
//! intersected to answer a query; optionally backed by a precomputed full
//! query cache instead (see the `lookup_cache` feature).

#[cfg(feature = "lookup_cache")]
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use smallvec::SmallVec;

use crate::error::ConfigError;
use crate::types::{glyph_index, normalize_glyph, Glyph, WordId};
use crate::DIM;

/// An ordered list of up to `DIM` `(position, letter)` fixed-letter
/// constraints, positions strictly increasing. Backed by a `SmallVec`
/// rather than a heap `Vec`: these are built and torn down on every search
/// step, and `DIM` bounds their size at compile time, so there's no reason
/// to pay for a heap allocation per query.
pub type Query = SmallVec<[(u8, Glyph); DIM]>;

/// Per-length posting lists and (optionally) the precomputed query cache.
struct LengthBucket {
    /// All word ids of this length, in ascending order (file order, since ids
    /// are assigned monotonically as the dictionary is read).
    all_words: Vec<WordId>,
    /// `by_pos[position][glyph_index]` — ids of words of this length with
    /// `glyph` at `position`, ascending.
    by_pos: Vec<[Vec<WordId>; 26]>,
    /// Present only with the `lookup_cache` feature: every non-empty subset
    /// query arising from some word of this length, mapped to the matching
    /// word ids.
    #[cfg(feature = "lookup_cache")]
    query_cache: HashMap<Query, Vec<WordId>>,
}

impl LengthBucket {
    fn new(length: usize) -> Self {
        LengthBucket {
            all_words: Vec::new(),
            by_pos: (0..length).map(|_| std::array::from_fn(|_| Vec::new())).collect(),
            #[cfg(feature = "lookup_cache")]
            query_cache: HashMap::new(),
        }
    }
}

/// The dictionary, built once at startup and shared immutably across every
/// worker for the life of the process.
pub struct WordList {
    /// Original spellings, indexed by `WordId`.
    words: Vec<String>,
    /// `by_length[L]`, for `L` in `2..=DIM`; entries for `0` and `1` are
    /// present but always empty (tokens that short are skipped on load).
    by_length: Vec<LengthBucket>,
}

impl WordList {
    /// Read whitespace-separated tokens from `path`, normalize to lowercase,
    /// skip anything shorter than 2 or longer than `DIM`, and build the
    /// posting lists (and, with `lookup_cache`, the query cache).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path).map_err(|source| ConfigError::DictionaryUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = std::io::BufReader::new(file);
        let list = Self::from_reader(reader);
        if list.words.is_empty() {
            return Err(ConfigError::EmptyDictionary {
                path: path.to_path_buf(),
                max_len: DIM,
            });
        }
        tracing::info!(word_count = list.words.len(), path = %path.display(), "loaded dictionary");
        Ok(list)
    }

    /// Build from any whitespace-tokenized source. Exposed separately from
    /// [`Self::load`] so tests and other in-process embeddings can build a
    /// `WordList` from an in-memory string without touching the filesystem.
    pub fn from_reader(reader: impl BufRead) -> Self {
        let mut words = Vec::new();
        let mut by_length: Vec<LengthBucket> = (0..=DIM).map(LengthBucket::new).collect();

        for line in reader.lines() {
            let Ok(line) = line else { continue };
            for token in line.split_ascii_whitespace() {
                Self::ingest_token(token, &mut words, &mut by_length);
            }
        }

        WordList { words, by_length }
    }

    fn ingest_token(token: &str, words: &mut Vec<String>, by_length: &mut [LengthBucket]) {
        if token.len() < 2 || token.len() > DIM {
            return;
        }
        let mut glyphs: SmallVec<[Glyph; DIM]> = SmallVec::with_capacity(token.len());
        for b in token.bytes() {
            match normalize_glyph(b) {
                Some(g) => glyphs.push(g),
                // A non-letter byte in a token means it isn't a real word;
                // skip it rather than aborting the whole load.
                None => return,
            }
        }

        let id = words.len() as WordId;
        let length = glyphs.len();
        let bucket = &mut by_length[length];
        bucket.all_words.push(id);
        for (pos, &g) in glyphs.iter().enumerate() {
            bucket.by_pos[pos][glyph_index(g)].push(id);
        }
        #[cfg(feature = "lookup_cache")]
        Self::add_to_cache(bucket, &glyphs, id);

        words.push(String::from_utf8(glyphs.to_vec()).expect("glyphs are ascii"));
    }

    /// BFS-enumerate every non-empty subset of positions for this word
    /// (`2^L - 1` subsets) and append `id` to the cache bucket keyed by
    /// that subset.
    #[cfg(feature = "lookup_cache")]
    fn add_to_cache(bucket: &mut LengthBucket, glyphs: &[Glyph], id: WordId) {
        use std::collections::VecDeque;

        let mut queue: VecDeque<(usize, Query)> = VecDeque::new();
        queue.push_back((0, Query::new()));
        while let Some((level, query)) = queue.pop_front() {
            for i in level..glyphs.len() {
                let mut next_query = query.clone();
                next_query.push((i as u8, glyphs[i]));
                bucket
                    .query_cache
                    .entry(next_query.clone())
                    .or_default()
                    .push(id);
                queue.push_back((i + 1, next_query));
            }
        }
    }

    /// All word ids of the given length, ascending.
    #[must_use]
    pub fn words_of_length(&self, length: usize) -> &[WordId] {
        &self.by_length[length].all_words
    }

    /// The original spelling for a word id.
    #[must_use]
    pub fn word(&self, id: WordId) -> &str {
        &self.words[id as usize]
    }

    /// Answer `query`, allocating a fresh `Vec`. Prefer [`Self::query_into`]
    /// on the search hot path, which reuses a caller-owned scratch buffer
    /// instead and avoids a per-query allocation.
    #[must_use]
    pub fn query(&self, length: usize, q: &Query) -> Vec<WordId> {
        let mut scratch = Vec::new();
        self.query_into(length, q, &mut scratch);
        scratch
    }

    /// Answer `query` of the given `length` into `scratch`, returning the
    /// resulting slice. `scratch` is cleared and reused on every call.
    ///
    /// With no constraints, returns `words_of_length(length)` directly.
    ///
    /// Without the `lookup_cache` feature, intersects the posting lists
    /// left-to-right. Starting from the *shortest* posting list instead
    /// would be a valid latency optimization, but posting lists are small
    /// enough (`DIM` <= 9) that the ordering rarely matters in practice, so
    /// it isn't worth the extra bookkeeping.
    pub fn query_into<'s>(
        &self,
        length: usize,
        q: &Query,
        scratch: &'s mut Vec<WordId>,
    ) -> &'s [WordId] {
        scratch.clear();

        for &(pos, _) in q.iter() {
            assert!(
                (pos as usize) < length,
                "{}",
                crate::error::GridInvariantError::QueryPositionOutOfRange {
                    pos: pos as usize,
                    len: length,
                }
            );
        }

        if q.is_empty() {
            scratch.extend_from_slice(self.words_of_length(length));
            return scratch;
        }

        let bucket = &self.by_length[length];

        #[cfg(feature = "lookup_cache")]
        {
            if let Some(hit) = bucket.query_cache.get(q) {
                scratch.extend_from_slice(hit);
            }
            return scratch;
        }

        #[cfg(not(feature = "lookup_cache"))]
        {
            let (pos, g) = q[0];
            scratch.extend_from_slice(&bucket.by_pos[pos as usize][glyph_index(g)]);

            for &(pos, g) in &q[1..] {
                if scratch.is_empty() {
                    break;
                }
                let rhs = &bucket.by_pos[pos as usize][glyph_index(g)];
                intersect_in_place(scratch, rhs);
            }
            scratch
        }
    }
}

/// Intersect two ascending, duplicate-free `WordId` lists, compacting `lhs`
/// in place and dropping its unmatched tail.
fn intersect_in_place(lhs: &mut Vec<WordId>, rhs: &[WordId]) {
    if rhs.is_empty() {
        lhs.clear();
        return;
    }

    let mut write = 0;
    let mut r = 0;
    for read in 0..lhs.len() {
        let l_val = lhs[read];
        while r < rhs.len() && rhs[r] < l_val {
            r += 1;
        }
        if r >= rhs.len() {
            break;
        }
        if rhs[r] == l_val {
            lhs[write] = l_val;
            write += 1;
        }
    }
    lhs.truncate(write);
}
