use logmask::ToMeta;

#[derive(ToMeta)]
struct Pair(#[meta(rename = "left")] u8, u8);

fn main() {}
