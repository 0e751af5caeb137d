use logmask::ToMeta;

#[derive(ToMeta)]
union Bits {
    int: u32,
    float: f32,
}

fn main() {}
