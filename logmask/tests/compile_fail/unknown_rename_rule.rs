use logmask::ToMeta;

#[derive(ToMeta)]
#[meta(rename_all = "SHOUTING")]
struct Event {
    name: String,
}

fn main() {}
