//! The wait line behind the audio loader.
//!
//! Entry 0 is the download in flight (when one is running); everything after
//! it waits in request order. Reprioritizing only ever reorders the waiting
//! part.

use std::collections::VecDeque;

#[derive(Debug)]
pub(crate) struct QueuedFetch<R> {
    pub url: String,
    pub reply: R,
}

#[derive(Debug)]
pub(crate) struct FetchQueue<R> {
    entries: VecDeque<QueuedFetch<R>>,
    in_flight: bool,
}

impl<R> FetchQueue<R> {
    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            in_flight: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> bool {
        self.in_flight
    }

    #[cfg(test)]
    pub(crate) fn urls(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.url.as_str()).collect()
    }

    /// Append a request to the tail.
    pub(crate) fn push(&mut self, url: String, reply: R) {
        self.entries.push_back(QueuedFetch { url, reply });
    }

    /// Mark the head as in flight and return its URL, if nothing is running yet.
    pub(crate) fn start_next(&mut self) -> Option<String> {
        if self.in_flight {
            return None;
        }
        let head = self.entries.front()?;
        self.in_flight = true;
        Some(head.url.clone())
    }

    /// The in-flight download finished: pop it off the head.
    pub(crate) fn complete_head(&mut self) -> Option<QueuedFetch<R>> {
        if !self.in_flight {
            return None;
        }
        self.in_flight = false;
        self.entries.pop_front()
    }

    /// Pull every waiting request for `url` out of the line.
    pub(crate) fn take_waiting(&mut self, url: &str) -> Vec<QueuedFetch<R>> {
        let first_waiting = usize::from(self.in_flight);
        let mut taken = Vec::new();
        let mut i = first_waiting;
        while i < self.entries.len() {
            if self.entries[i].url == url {
                if let Some(e) = self.entries.remove(i) {
                    taken.push(e);
                }
            } else {
                i += 1;
            }
        }
        taken
    }

    /// Move the first waiting request for `url` to the front of the wait line,
    /// right behind the in-flight download. Returns whether anything moved.
    pub(crate) fn prioritize(&mut self, url: &str) -> bool {
        let first_waiting = usize::from(self.in_flight);
        let Some(offset) = self
            .entries
            .iter()
            .skip(first_waiting)
            .position(|e| e.url == url)
        else {
            return false;
        };

        let idx = first_waiting + offset;
        if idx == first_waiting {
            return false;
        }
        match self.entries.remove(idx) {
            Some(entry) => {
                self.entries.insert(first_waiting, entry);
                true
            }
            None => false,
        }
    }

    /// Empty the queue, in flight entry included.
    pub(crate) fn drain(&mut self) -> Vec<QueuedFetch<R>> {
        self.in_flight = false;
        self.entries.drain(..).collect()
    }
}
