//! Tests for marshaling layout work from other threads.

#[cfg(test)]
mod tests {
    use std::thread;

    use trellis::{UpdateMode, error::Result, geom::Rect, testing::Harness};

    #[test]
    fn requests_from_several_threads_are_all_applied() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let a = h.sized(h.root, 10, 10)?;
        h.core
            .constrain(a)?
            .align_parent_right()
            .apply(UpdateMode::Layout)?;
        let b = h.sized(h.root, 10, 10)?;
        h.layout()?;

        let workers: Vec<_> = [(a, 40), (b, 70)]
            .into_iter()
            .map(|(node, w)| {
                let handle = h.core.handle();
                thread::spawn(move || handle.set_width(node, w))
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker panicked");
        }

        assert_eq!(h.frame(a)?.w, 10);
        assert_eq!(h.core.process_requests()?, 2);
        assert_eq!(h.frame(a)?, Rect::new(260, 0, 40, 10));
        assert_eq!(h.frame(b)?.w, 70);
        Ok(())
    }

    #[test]
    fn failed_requests_do_not_block_the_rest() -> Result<()> {
        let mut h = Harness::new()?;
        let gone = h.sized(h.root, 10, 10)?;
        let kept = h.sized(h.root, 10, 10)?;
        h.core.remove_subtree(gone)?;

        let handle = h.core.handle();
        handle.invalidate(gone);
        handle.set_height(kept, 25);
        handle.post(move |core| core.set_position(kept, 3, 4, UpdateMode::Deferred));

        assert_eq!(h.core.process_requests()?, 3);
        assert_eq!(h.frame(kept)?, Rect::new(3, 4, 10, 25));
        assert_eq!(h.core.process_requests()?, 0);
        Ok(())
    }
}
