use crate::common::ticknet::TickNet;

/// H1 -1- RA -2- RB -3- H2
pub fn line() -> TickNet {
    TickNet::build(
        &["H1", "H2"],
        &[
            ("RA", &[("H1", 0, 1), ("RB", 1, 2)]),
            ("RB", &[("RA", 0, 2), ("H2", 1, 3)]),
        ],
        &[
            ("H1", 0, "RA", 0),
            ("RA", 1, "RB", 0),
            ("RB", 1, "H2", 0),
        ],
    )
}

/// The split-path network: H1 -1- RA -5- RB -1- RD -3- H3, with the cheaper
/// alternate branch RA -1- RC -1- RD.
pub fn split_path() -> TickNet {
    TickNet::build(
        &["H1", "H3"],
        &[
            ("RA", &[("H1", 0, 1), ("RB", 1, 5), ("RC", 2, 1)]),
            ("RB", &[("RA", 0, 5), ("RD", 1, 1)]),
            ("RC", &[("RA", 0, 1), ("RD", 1, 1)]),
            ("RD", &[("RB", 0, 1), ("RC", 1, 1), ("H3", 2, 3)]),
        ],
        &[
            ("H1", 0, "RA", 0),
            ("RA", 1, "RB", 0),
            ("RA", 2, "RC", 0),
            ("RB", 1, "RD", 0),
            ("RC", 1, "RD", 1),
            ("RD", 2, "H3", 0),
        ],
    )
}
