use anyhow::Result;

use crate::cli;
use crate::config::{Config, Overrides};

impl cli::Inspect {
    pub fn run(self) -> Result<()> {
        let config = Config::new(Overrides {
            listen: None,
            dir: self.dir.clone(),
        })?;

        let library = super::build_library(&config);
        let animation = library.build(&self.name)?;
        let cache = library.cache();
        let size = animation.byte_size();

        println!("name:        {}", self.name);
        println!("frames:      {}", animation.len());
        println!(
            "square size: {}x{}",
            animation.square_size, animation.square_size
        );
        println!("frame delay: {}ms", animation.delay);
        println!("payload:     {size} bytes");

        if cache.admits(&animation) {
            println!("cacheable:   yes");
        } else {
            println!("cacheable:   no (budget is {} bytes)", cache.budget());
        }

        Ok(())
    }
}
