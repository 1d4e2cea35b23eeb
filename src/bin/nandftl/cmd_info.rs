use anyhow::Result;
use serde_json::json;

use NandFTL::addr::Geometry;
use NandFTL::SsdConfig;

use crate::cli::GeometryArgs;

pub fn exec(geometry: GeometryArgs, json_out: bool) -> Result<()> {
    let cfg = geometry.apply(SsdConfig::from_env());
    cfg.validate()?;
    let g = Geometry::new(&cfg);

    if json_out {
        let info = json!({
            "config": {
                "ssd_size": cfg.ssd_size,
                "package_size": cfg.package_size,
                "die_size": cfg.die_size,
                "plane_size": cfg.plane_size,
                "block_size": cfg.block_size,
                "block_erases": cfg.block_erases,
                "overprovisioning": cfg.overprovisioning,
            },
            "derived": {
                "raw_pages": g.raw_pages,
                "op_pages": g.op_pages,
                "usable_pages": g.usable_pages,
                "num_logical_blocks": g.num_logical_blocks,
                "num_physical_blocks": g.num_physical_blocks,
            }
        });
        println!("{}", serde_json::to_string_pretty(&info).unwrap());
        return Ok(());
    }

    println!("{}", cfg);
    println!("Derived:");
    println!("  raw_pages           = {}", g.raw_pages);
    println!("  op_pages            = {}", g.op_pages);
    println!("  usable_pages        = {}", g.usable_pages);
    println!("  num_logical_blocks  = {}", g.num_logical_blocks);
    println!("  num_physical_blocks = {}", g.num_physical_blocks);
    Ok(())
}
