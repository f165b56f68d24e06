//! Tests for anchor resolution inside a parent's content box.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use trellis::{
        NodeId, UpdateMode,
        error::Result,
        geom::{Edges, Expanse, Rect, Side},
        layout::{AspectRatioMode, Length, SizeMode},
        testing::Harness,
    };

    #[test]
    fn parent_edges_and_sibling_chain() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let a = h.sized(h.root, 100, 50)?;
        h.core
            .constrain(a)?
            .width(SizeMode::Fixed)
            .height(SizeMode::Fixed)
            .align_parent_left()
            .align_parent_top()
            .margin_left(10)
            .margin_top(10)
            .apply(UpdateMode::Deferred)?;

        let b = h.sized(h.root, 10, 10)?;
        h.core
            .constrain(b)?
            .width(SizeMode::Filling)
            .right_of(a)
            .align_parent_top()
            .margin_left(10)
            .margin_right(10)
            .apply(UpdateMode::Deferred)?;
        h.layout()?;

        let fa = h.frame(a)?;
        assert_eq!(
            (fa.left(), fa.top(), fa.right(), fa.bottom()),
            (10, 10, 110, 60)
        );
        let fb = h.frame(b)?;
        assert_eq!((fb.left(), fb.right()), (120, 290));
        assert_eq!(fb.top(), 0);
        Ok(())
    }

    #[test]
    fn fixed_size_follows_request_within_bounds() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let a = h.sized(h.root, 300, 10)?;
        h.core
            .constrain(a)?
            .max_width(120)
            .min_height(30)
            .align_parent_left()
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?, Rect::new(0, 0, 120, 30));

        h.core.set_width(a, 50, UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?, Rect::new(0, 0, 50, 30));

        h.core.set_height(a, 5, UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?.h, 30);
        Ok(())
    }

    #[test]
    fn filling_spans_content_box_less_margins() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        h.core
            .set_padding(h.root, Edges::all(Length::Fixed(5)), UpdateMode::Layout)?;
        let a = h.core.add_child(h.root)?;
        h.core
            .constrain(a)?
            .fill()
            .margin_left(3)
            .margin_right(4)
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?, Rect::new(8, 5, 283, 190));

        h.core
            .constrain(a)?
            .max_width(100)
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?.w, 100);
        Ok(())
    }

    #[test]
    fn filling_collapses_when_edges_cross() -> Result<()> {
        let mut h = Harness::builder().size(100, 100).build()?;
        let a = h.sized(h.root, 90, 10)?;
        h.core
            .constrain(a)?
            .align_parent_left()
            .apply(UpdateMode::Init)?;
        let b = h.core.add_child(h.root)?;
        h.core
            .constrain(b)?
            .width(SizeMode::Filling)
            .right_of(a)
            .margin_left(20)
            .apply(UpdateMode::Layout)?;
        let fb = h.frame(b)?;
        assert_eq!((fb.left(), fb.w), (110, 0));
        Ok(())
    }

    #[test]
    fn centering_in_parent() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let a = h.sized(h.root, 100, 20)?;
        h.core
            .constrain(a)?
            .center_in_parent()
            .margin_left(10)
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?, Rect::new(105, 90, 100, 20));

        h.resize(400, 100)?;
        assert_eq!(h.frame(a)?, Rect::new(155, 40, 100, 20));
        Ok(())
    }

    #[test]
    fn centering_on_a_sibling() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let a = h.child(h.root, Rect::new(40, 0, 60, 30))?;
        let b = h.sized(h.root, 20, 10)?;
        h.core
            .constrain(b)?
            .align_center_horizontal(a)
            .below(a)
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(b)?, Rect::new(60, 30, 20, 10));
        Ok(())
    }

    #[test]
    fn references_across_parents() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let left = h.child(h.root, Rect::new(20, 30, 100, 100))?;
        let marker = h.child(left, Rect::new(10, 10, 20, 20))?;
        let right = h.child(h.root, Rect::new(150, 0, 100, 200))?;
        let follower = h.sized(right, 10, 10)?;
        h.core
            .constrain(follower)?
            .align_top(marker)
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(follower)?.top(), 40);
        Ok(())
    }

    #[test]
    fn references_into_later_subtrees_track_changes() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let right = h.child(h.root, Rect::new(150, 0, 100, 200))?;
        let left = h.child(h.root, Rect::new(20, 30, 100, 100))?;
        let marker = h.sized(left, 20, 20)?;
        h.core
            .constrain(marker)?
            .align_parent_bottom()
            .apply(UpdateMode::Init)?;
        let follower = h.sized(right, 10, 10)?;
        h.core
            .constrain(follower)?
            .align_top(marker)
            .apply(UpdateMode::Init)?;

        h.core.invalidate_layout(h.root, UpdateMode::Layout)?;
        assert_eq!(h.frame(marker)?.top(), 80);
        assert_eq!(h.frame(follower)?.top(), 110);

        h.core.set_height(left, 150, UpdateMode::Layout)?;
        assert_eq!(h.frame(marker)?.top(), 130);
        assert_eq!(h.frame(follower)?.top(), 160);

        h.core.set_children(h.root, vec![left, right])?;
        h.core.set_height(left, 60, UpdateMode::Layout)?;
        assert_eq!(h.frame(marker)?.top(), 40);
        assert_eq!(h.frame(follower)?.top(), 70);

        h.core.invalidate_layout(h.root, UpdateMode::Layout)?;
        assert_eq!(h.frame(follower)?.top(), 70);
        Ok(())
    }

    #[test]
    fn weighted_margins_follow_parent_size() -> Result<()> {
        let mut h = Harness::builder().size(200, 100).build()?;
        let a = h.sized(h.root, 20, 10)?;
        h.core
            .constrain(a)?
            .align_parent_left()
            .margin(Side::Left, Length::Weight(0.1))
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?.left(), 20);

        h.resize(400, 100)?;
        assert_eq!(h.frame(a)?.left(), 40);
        Ok(())
    }

    #[test]
    fn weighted_size_and_aspect_ratio() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let a = h.core.add_child(h.root)?;
        h.core
            .constrain(a)?
            .width_weight(0.5)
            .height_weight(0.25)
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?.size(), Expanse::new(150, 50));

        let b = h.sized(h.root, 100, 10)?;
        h.core
            .constrain(b)?
            .aspect_ratio_mode(AspectRatioMode::AdjustHeight)
            .aspect_ratio(2.0)
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(b)?.size(), Expanse::new(100, 50));
        Ok(())
    }

    #[test]
    fn fixed_children_keep_requested_frames_when_layouts_are_off() -> Result<()> {
        let mut h = Harness::builder().size(300, 200).build()?;
        let a = h.sized(h.root, 30, 30)?;
        h.core
            .constrain(a)?
            .align_parent_right()
            .apply(UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?.left(), 270);

        h.core
            .set_using_child_layouts(h.root, false, UpdateMode::Layout)?;
        h.core
            .set_frame(a, Rect::new(5, 5, 30, 30), UpdateMode::Layout)?;
        assert_eq!(h.frame(a)?, Rect::new(5, 5, 30, 30));
        Ok(())
    }

    /// Anchoring choices for generated children.
    #[derive(Debug, Clone, Copy)]
    enum Kind {
        /// Pinned to the parent's left edge.
        Left,
        /// After the previous sibling.
        After,
        /// Centered horizontally.
        Center,
        /// Filling the remaining width.
        Fill,
        /// A weighted width.
        Weight,
    }

    /// Strategy over all anchoring kinds.
    fn kind() -> impl Strategy<Value = Kind> {
        prop_oneof![
            Just(Kind::Left),
            Just(Kind::After),
            Just(Kind::Center),
            Just(Kind::Fill),
            Just(Kind::Weight),
        ]
    }

    /// Build a row of generated children, lay it out twice, and return the
    /// frames after each pass.
    fn layout_twice(specs: &[(Kind, i32, i32, i32)]) -> Result<(Vec<Rect>, Vec<Rect>)> {
        let mut h = Harness::builder().size(400, 300).build()?;
        let mut prev: Option<NodeId> = None;
        let mut ids = Vec::new();
        for (kind, w, hh, margin) in specs {
            let id = h.sized(h.root, *w, *hh)?;
            let c = h.core.constrain(id)?.margin_left(*margin).align_parent_top();
            let c = match (kind, prev) {
                (Kind::After, Some(p)) => c.right_of(p),
                (Kind::Left | Kind::After, _) => c.align_parent_left(),
                (Kind::Center, _) => c.center_horizontal(),
                (Kind::Fill, Some(p)) => c.width(SizeMode::Filling).right_of(p),
                (Kind::Fill, None) => c.width(SizeMode::Filling),
                (Kind::Weight, _) => c.width_weight(0.3),
            };
            c.apply(UpdateMode::Deferred)?;
            ids.push(id);
            prev = Some(id);
        }
        h.layout()?;
        let first = ids.iter().map(|id| h.frame(*id)).collect::<Result<Vec<_>>>()?;
        h.core.invalidate_layout(h.root, UpdateMode::Layout)?;
        let second = ids.iter().map(|id| h.frame(*id)).collect::<Result<Vec<_>>>()?;
        Ok((first, second))
    }

    proptest! {
        #[test]
        fn repeated_passes_are_idempotent(
            specs in prop::collection::vec((kind(), 0i32..200, 0i32..100, 0i32..30), 1..8)
        ) {
            let (first, second) = layout_twice(&specs).expect("layout");
            prop_assert_eq!(first, second);
        }

        #[test]
        fn fixed_width_is_the_clamped_request(
            w in 0i32..500,
            min in 0i32..200,
            max in 0i32..400,
        ) {
            let mut h = Harness::builder().size(400, 300).build().expect("harness");
            let a = h.sized(h.root, 10, 10).expect("child");
            h.core
                .constrain(a)
                .expect("record")
                .min_width(min)
                .max_width(max)
                .align_parent_left()
                .apply(UpdateMode::Layout)
                .expect("apply");
            h.core.set_width(a, w, UpdateMode::Layout).expect("width");
            let expected = if min > max { max } else { w.clamp(min, max) };
            prop_assert_eq!(h.frame(a).expect("frame").w, expected);
        }
    }
}
