use slotmap::new_key_type;

new_key_type! {
    /// Opaque identifier for a node stored in the Core arena.
    ///
    /// Ids carry a slot version, so an id held after its node is removed
    /// never resolves to a different node that reuses the slot.
    pub struct NodeId;
}
