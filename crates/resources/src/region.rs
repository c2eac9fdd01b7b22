//! Storage regions

string_enum! {
    /// Qiniu storage region id
    RegionId("region_id") {
        /// East China
        Z0 => "z0",
        /// North China
        Z1 => "z1",
        /// South China
        Z2 => "z2",
        /// North America
        Na0 => "na0",
        /// Southeast Asia
        As0 => "as0",
    }
}
